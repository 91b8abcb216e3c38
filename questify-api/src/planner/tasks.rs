use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;

use questify_core::AppState;
use questify_database::impls::tasks::{create_task, delete_task, list_tasks, update_task};
use questify_database::model::task::{Task, TaskFields, TaskKind};
use questify_utils::parse::non_empty_trimmed;

use crate::RouteMeta;
use crate::error::{ApiError, ApiResult};
use crate::planner::ensure_user;

pub const LIST_META: RouteMeta = RouteMeta {
    method: "GET",
    path: "/api/users/:user_id/tasks",
    desc: "List a user's tasks.",
    category: "planner",
};

pub const CREATE_META: RouteMeta = RouteMeta {
    method: "POST",
    path: "/api/users/:user_id/tasks",
    desc: "Create a habit, daily or todo task.",
    category: "planner",
};

pub const UPDATE_META: RouteMeta = RouteMeta {
    method: "PUT",
    path: "/api/users/:user_id/tasks/:task_id",
    desc: "Replace a task's fields.",
    category: "planner",
};

pub const DELETE_META: RouteMeta = RouteMeta {
    method: "DELETE",
    path: "/api/users/:user_id/tasks/:task_id",
    desc: "Delete a task.",
    category: "planner",
};

fn default_active() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct TaskRequest {
    pub title: String,
    #[serde(rename = "type", default)]
    pub kind: TaskKind,
    #[serde(default)]
    pub due_at: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl TaskRequest {
    fn into_fields(self) -> ApiResult<TaskFields> {
        let title = non_empty_trimmed(&self.title)
            .ok_or_else(|| ApiError::bad_request("Task title is required"))?
            .to_owned();

        Ok(TaskFields {
            title,
            kind: self.kind,
            due_at: self.due_at.filter(|due| !due.trim().is_empty()),
            is_active: self.is_active,
        })
    }
}

pub async fn list(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(list_tasks(&state.db, user_id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(request): Json<TaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let fields = request.into_fields()?;
    ensure_user(&state, user_id).await?;

    let task = create_task(&state.db, user_id, &fields).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn update(
    State(state): State<AppState>,
    Path((user_id, task_id)): Path<(i64, i64)>,
    Json(request): Json<TaskRequest>,
) -> ApiResult<Json<Task>> {
    let fields = request.into_fields()?;

    update_task(&state.db, user_id, task_id, &fields)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Task not found"))
}

pub async fn remove(
    State(state): State<AppState>,
    Path((user_id, task_id)): Path<(i64, i64)>,
) -> ApiResult<StatusCode> {
    if delete_task(&state.db, user_id, task_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Task not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::TaskRequest;
    use questify_database::model::task::TaskKind;

    #[test]
    fn request_defaults_match_a_new_todo() {
        let request: TaskRequest = serde_json::from_str(r#"{"title": "Stretch"}"#).unwrap();
        let fields = request.into_fields().unwrap();

        assert_eq!(fields.title, "Stretch");
        assert_eq!(fields.kind, TaskKind::Todo);
        assert!(fields.is_active);
        assert_eq!(fields.due_at, None);
    }

    #[test]
    fn request_reads_type_field() {
        let request: TaskRequest =
            serde_json::from_str(r#"{"title": "Read", "type": "daily", "is_active": false}"#)
                .unwrap();
        let fields = request.into_fields().unwrap();

        assert_eq!(fields.kind, TaskKind::Daily);
        assert!(!fields.is_active);
    }

    #[test]
    fn blank_title_is_rejected() {
        let request: TaskRequest = serde_json::from_str(r#"{"title": "  "}"#).unwrap();
        assert!(request.into_fields().is_err());
    }
}

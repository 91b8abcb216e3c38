use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;

use questify_core::AppState;
use questify_database::impls::quests::{create_quest, delete_quest, list_quests};
use questify_database::model::quest::{DEFAULT_QUEST_DIFFICULTY, NewQuest, Quest, QuestRank};
use questify_database::model::task::TaskKind;
use questify_utils::parse::non_empty_trimmed;

use crate::RouteMeta;
use crate::error::{ApiError, ApiResult};
use crate::planner::ensure_user;

pub const LIST_META: RouteMeta = RouteMeta {
    method: "GET",
    path: "/api/users/:user_id/quests",
    desc: "List a user's quests, newest first.",
    category: "planner",
};

pub const CREATE_META: RouteMeta = RouteMeta {
    method: "POST",
    path: "/api/users/:user_id/quests",
    desc: "Post a new quest to the user's board.",
    category: "planner",
};

pub const DELETE_META: RouteMeta = RouteMeta {
    method: "DELETE",
    path: "/api/users/:user_id/quests/:quest_id",
    desc: "Remove a quest.",
    category: "planner",
};

fn default_difficulty() -> i32 {
    DEFAULT_QUEST_DIFFICULTY
}

#[derive(Debug, Deserialize)]
pub struct QuestRequest {
    pub title: String,
    #[serde(rename = "type", default)]
    pub kind: TaskKind,
    #[serde(default)]
    pub rank: QuestRank,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub due_at: Option<String>,
    #[serde(default)]
    pub repeats_rule: Option<String>,
    #[serde(default = "default_difficulty")]
    pub difficulty: i32,
    #[serde(default)]
    pub is_negative: bool,
}

impl QuestRequest {
    fn into_new_quest(self) -> ApiResult<NewQuest> {
        let title = non_empty_trimmed(&self.title)
            .ok_or_else(|| ApiError::bad_request("Quest title is required"))?
            .to_owned();
        if self.difficulty < 0 {
            return Err(ApiError::bad_request("Difficulty cannot be negative"));
        }

        let mut tags: Vec<String> = self
            .tags
            .iter()
            .filter_map(|tag| non_empty_trimmed(tag))
            .map(str::to_owned)
            .collect();
        tags.dedup();

        Ok(NewQuest {
            title,
            kind: self.kind,
            rank: self.rank,
            notes: self.notes,
            tags,
            due_at: self.due_at,
            repeats_rule: self.repeats_rule,
            difficulty: self.difficulty,
            is_negative: self.is_negative,
        })
    }
}

pub async fn list(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<Vec<Quest>>> {
    Ok(Json(list_quests(&state.db, user_id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(request): Json<QuestRequest>,
) -> ApiResult<(StatusCode, Json<Quest>)> {
    let quest = request.into_new_quest()?;
    ensure_user(&state, user_id).await?;

    let created = create_quest(&state.db, user_id, &quest).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn remove(
    State(state): State<AppState>,
    Path((user_id, quest_id)): Path<(i64, i64)>,
) -> ApiResult<StatusCode> {
    if delete_quest(&state.db, user_id, quest_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("Quest not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::QuestRequest;
    use questify_database::model::quest::QuestRank;
    use questify_database::model::task::TaskKind;

    #[test]
    fn defaults_follow_a_fresh_e_rank_todo() {
        let request: QuestRequest = serde_json::from_str(r#"{"title": "Slay the laundry"}"#).unwrap();
        let quest = request.into_new_quest().unwrap();

        assert_eq!(quest.kind, TaskKind::Todo);
        assert_eq!(quest.rank, QuestRank::E);
        assert_eq!(quest.difficulty, 2);
        assert!(!quest.is_negative);
        assert!(quest.tags.is_empty());
    }

    #[test]
    fn tags_are_trimmed() {
        let request: QuestRequest = serde_json::from_str(
            r#"{"title": "Run", "rank": "S", "tags": [" fitness ", "", "fitness", "outdoor"]}"#,
        )
        .unwrap();
        let quest = request.into_new_quest().unwrap();

        assert_eq!(quest.rank, QuestRank::S);
        assert_eq!(quest.tags, vec!["fitness", "outdoor"]);
    }

    #[test]
    fn unknown_rank_fails_to_parse() {
        assert!(serde_json::from_str::<QuestRequest>(r#"{"title": "x", "rank": "Z"}"#).is_err());
    }

    #[test]
    fn negative_difficulty_is_rejected() {
        let request: QuestRequest =
            serde_json::from_str(r#"{"title": "x", "difficulty": -1}"#).unwrap();
        assert!(request.into_new_quest().is_err());
    }
}

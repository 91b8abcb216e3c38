use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;

use questify_core::AppState;
use questify_database::impls::calendar::{get_or_create_calendar_store, update_calendar_store};
use questify_database::model::calendar::CalendarStore;

use crate::RouteMeta;
use crate::error::{ApiError, ApiResult};
use crate::planner::ensure_user;

pub const GET_META: RouteMeta = RouteMeta {
    method: "GET",
    path: "/api/users/:user_id/calendar",
    desc: "Client calendar payloads, created empty on first access.",
    category: "calendar",
};

pub const UPDATE_META: RouteMeta = RouteMeta {
    method: "PATCH",
    path: "/api/users/:user_id/calendar",
    desc: "Overwrite the provided calendar payloads.",
    category: "calendar",
};

#[derive(Debug, Deserialize)]
pub struct CalendarPatch {
    #[serde(default)]
    pub store_local_events: Option<String>,
    #[serde(default)]
    pub store_tasks: Option<String>,
}

pub async fn get_calendar(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<CalendarStore>> {
    ensure_user(&state, user_id).await?;
    Ok(Json(get_or_create_calendar_store(&state.db, user_id).await?))
}

pub async fn update_calendar(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(patch): Json<CalendarPatch>,
) -> ApiResult<Json<CalendarStore>> {
    update_calendar_store(
        &state.db,
        user_id,
        patch.store_local_events.as_deref(),
        patch.store_tasks.as_deref(),
    )
    .await?
    .map(Json)
    .ok_or_else(|| ApiError::not_found("Calendar not found"))
}

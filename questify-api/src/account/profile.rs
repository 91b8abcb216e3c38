use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tracing::info;

use questify_core::AppState;
use questify_database::impls::users::{delete_user, get_user_profile};
use questify_database::model::user::UserProfile;

use crate::RouteMeta;
use crate::error::{ApiError, ApiResult};

pub const GET_META: RouteMeta = RouteMeta {
    method: "GET",
    path: "/api/users/:user_id",
    desc: "Full profile: identity, character and guild standing.",
    category: "account",
};

pub const DELETE_META: RouteMeta = RouteMeta {
    method: "DELETE",
    path: "/api/users/:user_id",
    desc: "Delete an account and everything it owns.",
    category: "account",
};

pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<UserProfile>> {
    get_user_profile(&state.db, user_id)
        .await?
        .map(Json)
        .ok_or_else(ApiError::user_not_found)
}

pub async fn delete_profile(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<StatusCode> {
    if !delete_user(&state.db, user_id).await? {
        return Err(ApiError::user_not_found());
    }

    info!(user_id, "account deleted");
    Ok(StatusCode::NO_CONTENT)
}

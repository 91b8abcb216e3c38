use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;

use questify_core::AppState;
use questify_database::impls::users::set_last_rollover;
use questify_utils::time::today_iso_date;

use crate::RouteMeta;
use crate::error::{ApiError, ApiResult};

pub const META: RouteMeta = RouteMeta {
    method: "PATCH",
    path: "/api/users/:user_id/rollover",
    desc: "Record today's daily rollover for the user.",
    category: "economy",
};

#[derive(Debug, Serialize)]
pub struct RolloverResponse {
    pub success: bool,
    pub last_rollover: String,
}

pub async fn update_rollover(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<RolloverResponse>> {
    let last_rollover = set_last_rollover(&state.db, user_id, &today_iso_date())
        .await?
        .ok_or_else(ApiError::user_not_found)?;

    Ok(Json(RolloverResponse {
        success: true,
        last_rollover,
    }))
}

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;

use questify_core::AppState;
use questify_progression::{Character, EconomyDelta};

use crate::RouteMeta;
use crate::error::ApiResult;

pub const META: RouteMeta = RouteMeta {
    method: "PATCH",
    path: "/api/users/:user_id/economy",
    desc: "Apply xp, gold and attribute deltas and resolve level-ups.",
    category: "economy",
};

#[derive(Debug, Serialize)]
pub struct EconomyUpdateResponse {
    pub id: i64,
    #[serde(flatten)]
    pub character: Character,
}

pub async fn update_economy(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(delta): Json<EconomyDelta>,
) -> ApiResult<Json<EconomyUpdateResponse>> {
    let character = state
        .accounts
        .apply_deltas(user_id, &state.engine, &delta)
        .await?;

    Ok(Json(EconomyUpdateResponse {
        id: user_id,
        character,
    }))
}

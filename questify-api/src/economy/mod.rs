pub mod rollover;
pub mod update;

use axum::Router;
use axum::routing::patch;

use questify_core::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(update::META.path, patch(update::update_economy))
        .route(rollover::META.path, patch(rollover::update_rollover))
}

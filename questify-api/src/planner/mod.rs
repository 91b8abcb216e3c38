pub mod quests;
pub mod tasks;

use axum::Router;
use axum::routing::{delete, get, put};

use questify_core::AppState;
use questify_database::impls::users::user_exists;

use crate::error::{ApiError, ApiResult};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            tasks::LIST_META.path,
            get(tasks::list).post(tasks::create),
        )
        .route(
            tasks::UPDATE_META.path,
            put(tasks::update).delete(tasks::remove),
        )
        .route(
            quests::LIST_META.path,
            get(quests::list).post(quests::create),
        )
        .route(quests::DELETE_META.path, delete(quests::remove))
}

pub(crate) async fn ensure_user(state: &AppState, user_id: i64) -> ApiResult<()> {
    if user_exists(&state.db, user_id).await? {
        Ok(())
    } else {
        Err(ApiError::user_not_found())
    }
}

pub mod oauth;
pub mod store;
pub mod sync;

use axum::Router;
use axum::routing::{get, post};

use questify_core::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            store::GET_META.path,
            get(store::get_calendar).patch(store::update_calendar),
        )
        .route(sync::SYNC_META.path, post(sync::sync_calendar))
        .route(sync::EVENTS_META.path, get(sync::list_events))
        .route(oauth::STATUS_META.path, get(oauth::status))
        .route(oauth::START_META.path, get(oauth::start))
        .route(oauth::CALLBACK_META.path, get(oauth::callback))
}

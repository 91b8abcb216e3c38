pub mod account;
pub mod calendar;
pub mod economy;
pub mod error;
pub mod planner;
pub mod utility;

use axum::Router;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use questify_core::AppState;

pub use error::ApiError;

#[derive(Clone, Copy, Debug, Serialize)]
pub struct RouteMeta {
    pub method: &'static str,
    pub path: &'static str,
    pub desc: &'static str,
    pub category: &'static str,
}

pub const ROUTES: &[RouteMeta] = &[
    utility::health::META,
    utility::routes::META,
    account::signup::META,
    account::login::META,
    account::profile::GET_META,
    account::profile::DELETE_META,
    economy::update::META,
    economy::rollover::META,
    planner::tasks::LIST_META,
    planner::tasks::CREATE_META,
    planner::tasks::UPDATE_META,
    planner::tasks::DELETE_META,
    planner::quests::LIST_META,
    planner::quests::CREATE_META,
    planner::quests::DELETE_META,
    calendar::store::GET_META,
    calendar::store::UPDATE_META,
    calendar::sync::SYNC_META,
    calendar::sync::EVENTS_META,
    calendar::oauth::STATUS_META,
    calendar::oauth::START_META,
    calendar::oauth::CALLBACK_META,
];

/// Full application router with tracing and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(utility::routes())
        .merge(account::routes())
        .merge(economy::routes())
        .merge(planner::routes())
        .merge(calendar::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

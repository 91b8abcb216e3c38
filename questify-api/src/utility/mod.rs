pub mod health;
pub mod routes;

use axum::Router;
use axum::routing::get;

use questify_core::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(health::META.path, get(health::health))
        .route(routes::META.path, get(routes::list_routes))
}

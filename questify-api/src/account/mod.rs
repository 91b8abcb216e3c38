pub mod login;
pub mod profile;
pub mod signup;

use axum::Router;
use axum::routing::{get, post};

use questify_core::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(signup::META.path, post(signup::signup))
        .route(login::META.path, post(login::login))
        .route(
            profile::GET_META.path,
            get(profile::get_profile).delete(profile::delete_profile),
        )
}

/// Run bcrypt on the blocking pool.
pub(crate) async fn blocking<T, F>(work: F) -> anyhow::Result<T>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| anyhow::anyhow!("password hashing task failed: {e}"))?
}

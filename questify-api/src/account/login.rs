use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use tracing::debug;

use questify_core::AppState;
use questify_database::impls::users::find_credentials_by_email;
use questify_database::model::user::UserIdentity;
use questify_utils::parse::normalize_email;

use crate::RouteMeta;
use crate::account::blocking;
use crate::error::{ApiError, ApiResult};

pub const META: RouteMeta = RouteMeta {
    method: "POST",
    path: "/api/login",
    desc: "Check credentials and return the account identity.",
    category: "account",
};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<UserIdentity>> {
    let email = normalize_email(&request.email).ok_or(ApiError::Unauthorized)?;

    let Some(credentials) = find_credentials_by_email(&state.db, &email).await? else {
        debug!("login for unknown email");
        return Err(ApiError::Unauthorized);
    };

    let password = request.password;
    let pass_hash = credentials.pass_hash;
    let verified = blocking(move || {
        bcrypt::verify(password, &pass_hash).map_err(|e| anyhow::anyhow!(e))
    })
    .await?;

    if !verified {
        debug!(user_id = credentials.identity.id, "login with wrong password");
        return Err(ApiError::Unauthorized);
    }

    Ok(Json(credentials.identity))
}

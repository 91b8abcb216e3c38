use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use tracing::info;

use questify_core::AppState;
use questify_database::impls::users::create_user;
use questify_database::model::user::UserIdentity;
use questify_utils::parse::{non_empty_trimmed, normalize_email};

use crate::RouteMeta;
use crate::account::blocking;
use crate::error::{ApiError, ApiResult};

pub const META: RouteMeta = RouteMeta {
    method: "POST",
    path: "/api/signup",
    desc: "Create an account with a level 1 character.",
    category: "account",
};

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub display_name: String,
    pub password: String,
}

/// Validated signup input.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct SignupInput {
    pub email: String,
    pub display_name: String,
}

pub(crate) fn validate(request: &SignupRequest) -> ApiResult<SignupInput> {
    let email = normalize_email(&request.email)
        .ok_or_else(|| ApiError::bad_request("A valid email is required"))?;
    let display_name = non_empty_trimmed(&request.display_name)
        .ok_or_else(|| ApiError::bad_request("Display name is required"))?
        .to_owned();
    if request.password.is_empty() {
        return Err(ApiError::bad_request("Password is required"));
    }

    Ok(SignupInput {
        email,
        display_name,
    })
}

pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> ApiResult<(StatusCode, Json<UserIdentity>)> {
    let input = validate(&request)?;

    let password = request.password;
    let pass_hash = blocking(move || {
        bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(|e| anyhow::anyhow!(e))
    })
    .await?;

    let identity = create_user(&state.db, &input.email, &input.display_name, &pass_hash)
        .await?
        .ok_or_else(|| ApiError::Conflict("Email already exists".to_owned()))?;

    info!(user_id = identity.id, "account created");
    Ok((StatusCode::CREATED, Json(identity)))
}

#[cfg(test)]
mod tests {
    use super::{SignupInput, SignupRequest, validate};

    fn request(email: &str, display_name: &str, password: &str) -> SignupRequest {
        SignupRequest {
            email: email.to_owned(),
            display_name: display_name.to_owned(),
            password: password.to_owned(),
        }
    }

    #[test]
    fn accepts_and_normalizes_valid_input() {
        let input = validate(&request(" Hero@Guild.Example", "  Aria ", "hunter2")).unwrap();
        assert_eq!(
            input,
            SignupInput {
                email: "hero@guild.example".to_owned(),
                display_name: "Aria".to_owned(),
            }
        );
    }

    #[test]
    fn rejects_missing_fields() {
        assert!(validate(&request("not-an-email", "Aria", "pw")).is_err());
        assert!(validate(&request("hero@guild.example", "   ", "pw")).is_err());
        assert!(validate(&request("hero@guild.example", "Aria", "")).is_err());
    }
}

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::Html;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use questify_core::AppState;
use questify_database::impls::calendar::{get_calendar_account, upsert_calendar_account};
use questify_database::impls::oauth_state::{
    stash_pending_authorization, take_pending_authorization,
};
use questify_database::model::calendar::{CalendarAccount, CalendarProvider};
use questify_database::model::oauth::PendingAuthorization;
use questify_utils::pkce::{PkcePair, random_state};

use crate::RouteMeta;
use crate::error::{ApiError, ApiResult};

pub const STATUS_META: RouteMeta = RouteMeta {
    method: "GET",
    path: "/oauth/status",
    desc: "Whether the user has a connected calendar, and which provider.",
    category: "calendar",
};

pub const START_META: RouteMeta = RouteMeta {
    method: "GET",
    path: "/oauth/:provider/start",
    desc: "Begin a PKCE authorization with google or microsoft.",
    category: "calendar",
};

pub const CALLBACK_META: RouteMeta = RouteMeta {
    method: "GET",
    path: "/oauth/:provider/callback",
    desc: "Provider redirect target; stores tokens and notifies the opener window.",
    category: "calendar",
};

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: i64,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub connected: bool,
    pub provider: Option<CalendarProvider>,
}

#[derive(Debug, Serialize)]
pub struct StartResponse {
    pub auth_url: String,
    pub state: String,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

pub async fn status(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<StatusResponse>> {
    let account = get_calendar_account(&state.db, query.user_id).await?;

    Ok(Json(StatusResponse {
        connected: account.is_some(),
        provider: account.map(|account| account.provider),
    }))
}

fn parse_provider(raw: &str) -> ApiResult<CalendarProvider> {
    raw.parse()
        .map_err(|_| ApiError::not_found(format!("Unknown calendar provider `{raw}`")))
}

pub async fn start(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<StartResponse>> {
    let provider = parse_provider(&provider)?;
    let config = state.oauth.provider(provider).ok_or_else(|| {
        ApiError::not_found(format!("{provider} calendar integration is not configured"))
    })?;
    state.accounts.fetch(query.user_id).await?;

    let pkce = PkcePair::generate();
    let oauth_state = random_state();
    let auth_url = config.authorization_url(&oauth_state, &pkce.challenge)?;

    stash_pending_authorization(
        &state.db,
        &oauth_state,
        &PendingAuthorization {
            provider,
            user_id: query.user_id,
            verifier: pkce.verifier,
        },
    )
    .await?;

    info!(user_id = query.user_id, %provider, "calendar authorization started");
    Ok(Json(StartResponse {
        auth_url,
        state: oauth_state,
    }))
}

pub async fn callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<CallbackQuery>,
) -> Html<String> {
    match complete_authorization(&state, &provider, query).await {
        Ok(provider) => Html(opener_message("oauth-success", Some(provider))),
        Err(err) => {
            warn!(?err, "calendar authorization failed");
            Html(opener_message("oauth-error", None))
        }
    }
}

async fn complete_authorization(
    state: &AppState,
    provider: &str,
    query: CallbackQuery,
) -> anyhow::Result<CalendarProvider> {
    let provider: CalendarProvider = provider.parse()?;

    if let Some(error) = query.error {
        anyhow::bail!("provider returned error `{error}`");
    }
    let (Some(code), Some(oauth_state)) = (query.code, query.state) else {
        anyhow::bail!("callback is missing code or state");
    };

    let pending = take_pending_authorization(&state.db, &oauth_state)
        .await?
        .ok_or_else(|| anyhow::anyhow!("unknown or expired authorization state"))?;
    if pending.provider != provider {
        anyhow::bail!(
            "state was issued for {} but returned to {provider}",
            pending.provider
        );
    }

    let grant = state
        .oauth
        .exchange_code(provider, &code, &pending.verifier)
        .await?;

    upsert_calendar_account(
        &state.db,
        &CalendarAccount {
            user_id: pending.user_id,
            provider,
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            expires_at: Some(grant.expires_at),
        },
    )
    .await?;

    info!(user_id = pending.user_id, %provider, "calendar connected");
    Ok(provider)
}

/// Small page that reports the outcome to the window that opened the popup.
fn opener_message(kind: &str, provider: Option<CalendarProvider>) -> String {
    let payload = match provider {
        Some(provider) => format!("{{type:'{kind}',provider:'{provider}'}}"),
        None => format!("{{type:'{kind}'}}"),
    };

    format!(
        "<script>if(window.opener){{window.opener.postMessage({payload},'*');}}window.close();</script>"
    )
}

#[cfg(test)]
mod tests {
    use super::{opener_message, parse_provider};
    use questify_database::model::calendar::CalendarProvider;

    #[test]
    fn opener_message_carries_provider() {
        let page = opener_message("oauth-success", Some(CalendarProvider::Google));
        assert!(page.contains("{type:'oauth-success',provider:'google'}"));
        assert!(page.contains("window.close()"));

        let page = opener_message("oauth-error", None);
        assert!(page.contains("{type:'oauth-error'}"));
    }

    #[test]
    fn provider_path_accepts_short_name() {
        assert_eq!(parse_provider("ms").unwrap(), CalendarProvider::Microsoft);
        assert!(parse_provider("yahoo").is_err());
    }
}

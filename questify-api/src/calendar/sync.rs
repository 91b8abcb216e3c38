use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;
use tracing::{info, warn};

use questify_core::AppState;
use questify_database::impls::calendar::{
    get_calendar_account, list_calendar_events, upsert_calendar_account, upsert_calendar_events,
};
use questify_database::model::calendar::{CalendarAccount, CalendarEvent};
use questify_utils::time::now_unix_secs;

use crate::RouteMeta;
use crate::error::{ApiError, ApiResult};

pub const SYNC_META: RouteMeta = RouteMeta {
    method: "POST",
    path: "/api/users/:user_id/calendar/sync",
    desc: "Import events from the connected calendar provider.",
    category: "calendar",
};

pub const EVENTS_META: RouteMeta = RouteMeta {
    method: "GET",
    path: "/api/users/:user_id/calendar/events",
    desc: "Imported calendar events ordered by start time.",
    category: "calendar",
};

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub imported: u64,
}

pub async fn sync_calendar(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<SyncResponse>> {
    let mut account = get_calendar_account(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::bad_request("No connected calendar"))?;

    if state.oauth.provider(account.provider).is_none() {
        return Err(ApiError::bad_request(format!(
            "{} calendar integration is not configured",
            account.provider
        )));
    }

    if account.is_expired(now_unix_secs()) {
        account = refresh_account(&state, account).await?;
    }

    let events = state
        .oauth
        .fetch_events(account.provider, &account.access_token)
        .await?;
    let imported = upsert_calendar_events(&state.db, user_id, account.provider, &events).await?;

    info!(user_id, provider = %account.provider, imported, "calendar synced");
    Ok(Json(SyncResponse { imported }))
}

async fn refresh_account(state: &AppState, account: CalendarAccount) -> ApiResult<CalendarAccount> {
    let Some(refresh_token) = account.refresh_token.as_deref() else {
        warn!(user_id = account.user_id, "calendar token expired without refresh token");
        return Err(ApiError::bad_request(
            "Calendar authorization expired; reconnect the calendar",
        ));
    };

    let grant = state.oauth.refresh(account.provider, refresh_token).await?;
    let refreshed = CalendarAccount {
        access_token: grant.access_token,
        refresh_token: grant.refresh_token.or(account.refresh_token),
        expires_at: Some(grant.expires_at),
        ..account
    };

    upsert_calendar_account(&state.db, &refreshed).await?;
    Ok(refreshed)
}

pub async fn list_events(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<Vec<CalendarEvent>>> {
    Ok(Json(list_calendar_events(&state.db, user_id).await?))
}

use crate::{
    cache::{OAUTH_STATE_TTL, oauth_state_key},
    database::Database,
    model::oauth::PendingAuthorization,
};

/// Remember an authorization in flight until its callback arrives or it expires.
pub async fn stash_pending_authorization(
    db: &Database,
    state: &str,
    pending: &PendingAuthorization,
) -> anyhow::Result<()> {
    let cache = db.cache();
    cache
        .set_json(&oauth_state_key(cache, state), pending, OAUTH_STATE_TTL)
        .await
}

/// Claim the authorization for `state`. A state can be claimed once.
pub async fn take_pending_authorization(
    db: &Database,
    state: &str,
) -> anyhow::Result<Option<PendingAuthorization>> {
    let cache = db.cache();
    cache.take_json(&oauth_state_key(cache, state)).await
}

use anyhow::Context as _;

use questify_utils::time::now_unix_secs;

use crate::{
    database::Database,
    model::calendar::{CalendarAccount, CalendarEvent, CalendarProvider, CalendarStore, ImportedEvent},
};

#[derive(sqlx::FromRow)]
struct CalendarStoreRow {
    store_local_events: String,
    store_tasks: String,
}

#[derive(sqlx::FromRow)]
struct CalendarAccountRow {
    user_id: i64,
    provider: String,
    access_token: String,
    refresh_token: Option<String>,
    expires_at: Option<i64>,
}

#[derive(sqlx::FromRow)]
struct CalendarEventRow {
    id: i64,
    provider: String,
    title: String,
    starts_at: String,
    ends_at: String,
    description: Option<String>,
}

// ---------------------------------------------------------------------------
// Client calendar payloads
// ---------------------------------------------------------------------------

/// Return the user's calendar payloads, creating empty ones on first access.
pub async fn get_or_create_calendar_store(
    db: &Database,
    user_id: i64,
) -> anyhow::Result<CalendarStore> {
    let row: CalendarStoreRow = sqlx::query_as(
        "INSERT INTO calendar_stores (user_id) VALUES ($1)
         ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
         RETURNING store_local_events, store_tasks",
    )
    .bind(user_id)
    .fetch_one(db.pool())
    .await?;

    Ok(CalendarStore {
        store_local_events: row.store_local_events,
        store_tasks: row.store_tasks,
    })
}

/// Overwrite only the provided payloads. Returns `None` when no row exists yet.
pub async fn update_calendar_store(
    db: &Database,
    user_id: i64,
    store_local_events: Option<&str>,
    store_tasks: Option<&str>,
) -> anyhow::Result<Option<CalendarStore>> {
    let row: Option<CalendarStoreRow> = sqlx::query_as(
        "UPDATE calendar_stores
         SET store_local_events = COALESCE($1, store_local_events),
             store_tasks = COALESCE($2, store_tasks)
         WHERE user_id = $3
         RETURNING store_local_events, store_tasks",
    )
    .bind(store_local_events)
    .bind(store_tasks)
    .bind(user_id)
    .fetch_optional(db.pool())
    .await?;

    Ok(row.map(|row| CalendarStore {
        store_local_events: row.store_local_events,
        store_tasks: row.store_tasks,
    }))
}

// ---------------------------------------------------------------------------
// Connected provider accounts
// ---------------------------------------------------------------------------

pub async fn get_calendar_account(
    db: &Database,
    user_id: i64,
) -> anyhow::Result<Option<CalendarAccount>> {
    let row: Option<CalendarAccountRow> = sqlx::query_as(
        "SELECT user_id, provider, access_token, refresh_token, expires_at
         FROM calendar_accounts
         WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(db.pool())
    .await?;

    row.map(to_calendar_account).transpose()
}

/// Store tokens for a user, replacing any previously connected provider.
pub async fn upsert_calendar_account(db: &Database, account: &CalendarAccount) -> anyhow::Result<()> {
    let expires_at = account
        .expires_at
        .map(i64::try_from)
        .transpose()
        .context("expires_at out of i64 range")?;
    let now = i64::try_from(now_unix_secs()).context("now out of i64 range")?;

    sqlx::query(
        "INSERT INTO calendar_accounts (user_id, provider, access_token, refresh_token, expires_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6)
         ON CONFLICT (user_id) DO UPDATE SET
            provider = EXCLUDED.provider,
            access_token = EXCLUDED.access_token,
            refresh_token = COALESCE(EXCLUDED.refresh_token, calendar_accounts.refresh_token),
            expires_at = EXCLUDED.expires_at,
            updated_at = EXCLUDED.updated_at",
    )
    .bind(account.user_id)
    .bind(account.provider.as_str())
    .bind(&account.access_token)
    .bind(account.refresh_token.as_deref())
    .bind(expires_at)
    .bind(now)
    .execute(db.pool())
    .await?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Imported events
// ---------------------------------------------------------------------------

/// Store imported events, refreshing ones already seen. Returns the number written.
pub async fn upsert_calendar_events(
    db: &Database,
    user_id: i64,
    provider: CalendarProvider,
    events: &[ImportedEvent],
) -> anyhow::Result<u64> {
    let now = i64::try_from(now_unix_secs()).context("now out of i64 range")?;
    let mut tx = db.pool().begin().await?;
    let mut written = 0_u64;

    for event in events {
        written += sqlx::query(
            "INSERT INTO calendar_events (
                user_id, provider, external_id, title, starts_at, ends_at, description, imported_at
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (user_id, provider, external_id) DO UPDATE SET
                title = EXCLUDED.title,
                starts_at = EXCLUDED.starts_at,
                ends_at = EXCLUDED.ends_at,
                description = EXCLUDED.description,
                imported_at = EXCLUDED.imported_at",
        )
        .bind(user_id)
        .bind(provider.as_str())
        .bind(&event.external_id)
        .bind(&event.title)
        .bind(&event.start)
        .bind(&event.end)
        .bind(event.description.as_deref())
        .bind(now)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }

    tx.commit().await?;
    Ok(written)
}

pub async fn list_calendar_events(db: &Database, user_id: i64) -> anyhow::Result<Vec<CalendarEvent>> {
    let rows: Vec<CalendarEventRow> = sqlx::query_as(
        "SELECT id, provider, title, starts_at, ends_at, description
         FROM calendar_events
         WHERE user_id = $1
         ORDER BY starts_at ASC, id ASC",
    )
    .bind(user_id)
    .fetch_all(db.pool())
    .await?;

    rows.into_iter()
        .map(|row| {
            Ok(CalendarEvent {
                id: row.id,
                provider: row.provider.parse().context("event provider row is invalid")?,
                title: row.title,
                start: row.starts_at,
                end: row.ends_at,
                description: row.description,
            })
        })
        .collect()
}

fn to_calendar_account(row: CalendarAccountRow) -> anyhow::Result<CalendarAccount> {
    Ok(CalendarAccount {
        user_id: row.user_id,
        provider: row.provider.parse().context("account provider row is invalid")?,
        access_token: row.access_token,
        refresh_token: row.refresh_token,
        expires_at: row
            .expires_at
            .map(u64::try_from)
            .transpose()
            .context("expires_at row out of u64 range")?,
    })
}

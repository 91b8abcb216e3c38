use anyhow::Context as _;

use questify_progression::{Attributes, Character};
use questify_utils::time::now_unix_secs;

use crate::{
    cache::profile_key,
    database::Database,
    model::user::{UserCredentials, UserIdentity, UserProfile},
};

#[derive(sqlx::FromRow)]
struct IdentityRow {
    id: i64,
    email: String,
    display_name: String,
}

#[derive(sqlx::FromRow)]
struct CredentialsRow {
    id: i64,
    email: String,
    display_name: String,
    pass_hash: String,
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: i64,
    email: String,
    display_name: String,
    user_class: Option<String>,
    guild_rank: Option<String>,
    guild_streak: i64,
    diamonds: i64,
    last_rollover: Option<String>,
    level: i64,
    xp: i64,
    xp_max: i64,
    gold: i64,
    strength: i64,
    dexterity: i64,
    intelligence: i64,
    wisdom: i64,
    charisma: i64,
}

/// Create an account with a fresh character. Returns `None` when the email is taken.
pub async fn create_user(
    db: &Database,
    email: &str,
    display_name: &str,
    pass_hash: &str,
) -> anyhow::Result<Option<UserIdentity>> {
    let created_at = i64::try_from(now_unix_secs()).context("created_at out of i64 range")?;
    let character = Character::new_default();

    let row: Option<IdentityRow> = sqlx::query_as(
        "INSERT INTO users (
            email, display_name, pass_hash, level, xp, xp_max, gold,
            strength, dexterity, intelligence, wisdom, charisma, created_at
         ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
         ON CONFLICT (email) DO NOTHING
         RETURNING id, email, display_name",
    )
    .bind(email)
    .bind(display_name)
    .bind(pass_hash)
    .bind(character.level)
    .bind(character.experience)
    .bind(character.experience_ceiling)
    .bind(character.currency)
    .bind(character.attributes.strength)
    .bind(character.attributes.dexterity)
    .bind(character.attributes.intelligence)
    .bind(character.attributes.wisdom)
    .bind(character.attributes.charisma)
    .bind(created_at)
    .fetch_optional(db.pool())
    .await?;

    if let Some(row) = &row {
        db.invalidate_profile(row.id).await;
    }

    Ok(row.map(|row| UserIdentity {
        id: row.id,
        email: row.email,
        display_name: row.display_name,
    }))
}

pub async fn find_credentials_by_email(
    db: &Database,
    email: &str,
) -> anyhow::Result<Option<UserCredentials>> {
    let row: Option<CredentialsRow> = sqlx::query_as(
        "SELECT id, email, display_name, pass_hash FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(db.pool())
    .await?;

    Ok(row.map(|row| UserCredentials {
        identity: UserIdentity {
            id: row.id,
            email: row.email,
            display_name: row.display_name,
        },
        pass_hash: row.pass_hash,
    }))
}

pub async fn user_exists(db: &Database, user_id: i64) -> anyhow::Result<bool> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
        .bind(user_id)
        .fetch_one(db.pool())
        .await?;

    Ok(exists)
}

/// Load a full profile, served from cache when fresh. Missing users are not cached.
pub async fn get_user_profile(db: &Database, user_id: i64) -> anyhow::Result<Option<UserProfile>> {
    let cache = db.cache();
    let key = profile_key(cache, user_id);

    cache
        .get_or_load_json(&key, cache.profile_ttl(), || {
            load_user_profile(db, user_id)
        })
        .await
}

async fn load_user_profile(db: &Database, user_id: i64) -> anyhow::Result<Option<UserProfile>> {
    let row: Option<ProfileRow> = sqlx::query_as(
        "SELECT id, email, display_name, user_class, guild_rank, guild_streak, diamonds,
                last_rollover, level, xp, xp_max, gold,
                strength, dexterity, intelligence, wisdom, charisma
         FROM users
         WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(db.pool())
    .await?;

    Ok(row.map(to_user_profile))
}

/// Delete an account; dependent rows go with it through cascading keys.
pub async fn delete_user(db: &Database, user_id: i64) -> anyhow::Result<bool> {
    let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(db.pool())
        .await?
        .rows_affected();

    db.invalidate_profile(user_id).await;
    Ok(deleted > 0)
}

/// Stamp today's UTC date as the user's last daily rollover.
pub async fn set_last_rollover(
    db: &Database,
    user_id: i64,
    date: &str,
) -> anyhow::Result<Option<String>> {
    let stored: Option<Option<String>> = sqlx::query_scalar(
        "UPDATE users SET last_rollover = $1 WHERE id = $2 RETURNING last_rollover",
    )
    .bind(date)
    .bind(user_id)
    .fetch_optional(db.pool())
    .await?;

    db.invalidate_profile(user_id).await;
    Ok(stored.flatten())
}

fn to_user_profile(row: ProfileRow) -> UserProfile {
    UserProfile {
        id: row.id,
        email: row.email,
        display_name: row.display_name,
        user_class: row.user_class,
        guild_rank: row.guild_rank,
        guild_streak: row.guild_streak,
        diamonds: row.diamonds,
        last_rollover: row.last_rollover,
        character: Character {
            level: row.level,
            experience: row.xp,
            experience_ceiling: row.xp_max,
            currency: row.gold,
            attributes: Attributes {
                strength: row.strength,
                dexterity: row.dexterity,
                intelligence: row.intelligence,
                wisdom: row.wisdom,
                charisma: row.charisma,
            },
        },
    }
}

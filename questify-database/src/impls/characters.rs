use anyhow::Context as _;
use async_trait::async_trait;
use tracing::{debug, info};

use questify_progression::{
    AccountStore, Attributes, Character, EconomyDelta, ProgressionEngine, StoreError,
};

use crate::database::Database;

#[derive(sqlx::FromRow)]
struct CharacterRow {
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

impl From<CharacterRow> for Character {
    fn from(row: CharacterRow) -> Self {
        Self {
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
        }
    }
}

const SELECT_CHARACTER: &str = "SELECT level, xp, xp_max, gold,
        strength, dexterity, intelligence, wisdom, charisma
     FROM users
     WHERE id = $1";

const UPDATE_CHARACTER: &str = "UPDATE users
     SET level = $1, xp = $2, xp_max = $3, gold = $4,
         strength = $5, dexterity = $6, intelligence = $7, wisdom = $8, charisma = $9
     WHERE id = $10";

/// Character storage on the `users` table.
///
/// Economy updates run inside a transaction holding the row lock, so two
/// requests for the same user apply one after the other.
#[derive(Clone, Debug)]
pub struct PgAccountStore {
    db: Database,
}

impl PgAccountStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

fn bind_character<'q>(
    query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    user_id: i64,
    character: &Character,
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    query
        .bind(character.level)
        .bind(character.experience)
        .bind(character.experience_ceiling)
        .bind(character.currency)
        .bind(character.attributes.strength)
        .bind(character.attributes.dexterity)
        .bind(character.attributes.intelligence)
        .bind(character.attributes.wisdom)
        .bind(character.attributes.charisma)
        .bind(user_id)
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn fetch(&self, user_id: i64) -> Result<Character, StoreError> {
        let row: Option<CharacterRow> = sqlx::query_as(SELECT_CHARACTER)
            .bind(user_id)
            .fetch_optional(self.db.pool())
            .await
            .context("failed to load character")?;

        row.map(Character::from).ok_or(StoreError::NotFound(user_id))
    }

    async fn persist(&self, user_id: i64, character: &Character) -> Result<(), StoreError> {
        let updated = bind_character(sqlx::query(UPDATE_CHARACTER), user_id, character)
            .execute(self.db.pool())
            .await
            .context("failed to persist character")?
            .rows_affected();

        self.db.invalidate_profile(user_id).await;

        if updated == 0 {
            return Err(StoreError::NotFound(user_id));
        }

        Ok(())
    }

    async fn apply_deltas(
        &self,
        user_id: i64,
        engine: &ProgressionEngine,
        delta: &EconomyDelta,
    ) -> Result<Character, StoreError> {
        let mut tx = self
            .db
            .pool()
            .begin()
            .await
            .context("failed to open economy transaction")?;

        let locked_query = format!("{SELECT_CHARACTER} FOR UPDATE");
        let row: Option<CharacterRow> = sqlx::query_as(&locked_query)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await
            .context("failed to lock character")?;

        let Some(current) = row.map(Character::from) else {
            return Err(StoreError::NotFound(user_id));
        };

        let updated = engine.apply_deltas(current, delta);

        bind_character(sqlx::query(UPDATE_CHARACTER), user_id, &updated)
            .execute(&mut *tx)
            .await
            .context("failed to write character")?;

        tx.commit()
            .await
            .context("failed to commit economy transaction")?;

        self.db.invalidate_profile(user_id).await;

        if updated.level > current.level {
            info!(user_id, level = updated.level, "level up");
        }
        debug!(
            user_id,
            level = updated.level,
            xp = updated.experience,
            gold = updated.currency,
            "economy update committed"
        );

        Ok(updated)
    }
}

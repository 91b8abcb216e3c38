use sqlx::{PgPool, migrate::Migrator};

use crate::cache::{CacheService, INVALIDATE_FOLLOWUP_DELAY, profile_key};

/// Schema for users, planner entries and calendar data, embedded at compile time.
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Postgres pool plus the cache that fronts profile reads and holds
/// pending OAuth authorizations.
///
/// Cloning is cheap; every clone shares the same pool and cache backend.
#[derive(Clone, Debug)]
pub struct Database {
    pool: PgPool,
    cache: CacheService,
}

impl Database {
    /// Pool with a private in-process cache, enough for a single server instance.
    pub fn new(pool: PgPool) -> Self {
        Self::with_cache(pool, CacheService::in_memory("questify:prod"))
    }

    pub fn with_cache(pool: PgPool, cache: CacheService) -> Self {
        Self { pool, cache }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn cache(&self) -> &CacheService {
        &self.cache
    }

    /// Forget the cached profile of `user_id` after a write to its row.
    ///
    /// A second delete follows shortly after, dropping any profile a
    /// concurrent reader loaded before the write and cached after it.
    pub async fn invalidate_profile(&self, user_id: i64) {
        let key = profile_key(&self.cache, user_id);
        self.cache
            .invalidate_with_followup(&key, INVALIDATE_FOLLOWUP_DELAY)
            .await;
    }
}

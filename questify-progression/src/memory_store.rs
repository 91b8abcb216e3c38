use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::character::{Character, EconomyDelta};
use crate::engine::ProgressionEngine;
use crate::store::{AccountStore, StoreError};

/// Account store kept in process memory.
///
/// Every character sits behind its own mutex, so updates for one user are
/// serialized while different users proceed in parallel.
#[derive(Clone, Debug, Default)]
pub struct MemoryAccountStore {
    characters: Arc<RwLock<HashMap<i64, Arc<Mutex<Character>>>>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the character for `user_id`.
    pub async fn insert(&self, user_id: i64, character: Character) {
        self.characters
            .write()
            .await
            .insert(user_id, Arc::new(Mutex::new(character)));
    }

    pub async fn remove(&self, user_id: i64) -> bool {
        self.characters.write().await.remove(&user_id).is_some()
    }

    async fn slot(&self, user_id: i64) -> Result<Arc<Mutex<Character>>, StoreError> {
        self.characters
            .read()
            .await
            .get(&user_id)
            .cloned()
            .ok_or(StoreError::NotFound(user_id))
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn fetch(&self, user_id: i64) -> Result<Character, StoreError> {
        let slot = self.slot(user_id).await?;
        let character = *slot.lock().await;
        Ok(character)
    }

    async fn persist(&self, user_id: i64, character: &Character) -> Result<(), StoreError> {
        let slot = self.slot(user_id).await?;
        *slot.lock().await = *character;
        Ok(())
    }

    async fn apply_deltas(
        &self,
        user_id: i64,
        engine: &ProgressionEngine,
        delta: &EconomyDelta,
    ) -> Result<Character, StoreError> {
        let slot = self.slot(user_id).await?;
        let mut guard = slot.lock().await;

        let updated = engine.apply_deltas(*guard, delta);
        if updated.level > guard.level {
            info!(user_id, level = updated.level, "level up");
        }
        *guard = updated;

        debug!(
            user_id,
            level = updated.level,
            xp = updated.experience,
            "applied economy delta"
        );
        Ok(updated)
    }
}

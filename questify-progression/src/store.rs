use async_trait::async_trait;

use crate::character::{Character, EconomyDelta};
use crate::engine::ProgressionEngine;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("character for user {0} not found")]
    NotFound(i64),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Persistent owner of character records.
///
/// `apply_deltas` is the read-modify-write unit: implementations must serialize
/// concurrent calls for the same user so that no update is lost.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn fetch(&self, user_id: i64) -> Result<Character, StoreError>;

    async fn persist(&self, user_id: i64, character: &Character) -> Result<(), StoreError>;

    async fn apply_deltas(
        &self,
        user_id: i64,
        engine: &ProgressionEngine,
        delta: &EconomyDelta,
    ) -> Result<Character, StoreError>;
}

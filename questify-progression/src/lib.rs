/// Character record and the signed deltas applied to it.
pub mod character;
/// Level-up resolution and delta application.
pub mod engine;
/// In-process account store with per-character serialization.
pub mod memory_store;
/// Boundary trait for persistent character storage.
pub mod store;

pub use character::{Attributes, Character, EconomyDelta};
pub use engine::{FloorPolicy, ProgressionEngine};
pub use memory_store::MemoryAccountStore;
pub use store::{AccountStore, StoreError};

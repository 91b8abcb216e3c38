use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Entries beyond this count trigger a sweep of expired keys on write.
const SWEEP_THRESHOLD: usize = 1_024;

#[derive(Debug)]
struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

/// Expiring keyed store shared across tasks of one process.
#[derive(Clone, Debug, Default)]
pub struct MemoryCacheStore {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl MemoryCacheStore {
    pub async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    pub async fn set(&self, key: &str, value: Vec<u8>, ttl_seconds: u64) -> anyhow::Result<()> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        if entries.len() >= SWEEP_THRESHOLD {
            entries.retain(|_, entry| entry.expires_at > now);
        }

        entries.insert(
            key.to_owned(),
            Entry {
                value,
                expires_at: now + Duration::from_secs(ttl_seconds),
            },
        );

        Ok(())
    }

    pub async fn take(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let mut entries = self.entries.lock().await;

        Ok(entries
            .remove(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.value))
    }

    pub async fn del(&self, key: &str) -> anyhow::Result<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::MemoryCacheStore;

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let store = MemoryCacheStore::default();
        store.set("k", b"v".to_vec(), 5).await.unwrap();

        assert_eq!(store.get("k").await.unwrap(), Some(b"v".to_vec()));

        tokio::time::advance(Duration::from_secs(6)).await;
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn take_hands_out_value_once() {
        let store = MemoryCacheStore::default();
        store.set("state", b"verifier".to_vec(), 60).await.unwrap();

        assert_eq!(store.take("state").await.unwrap(), Some(b"verifier".to_vec()));
        assert_eq!(store.take("state").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_values_are_not_taken() {
        let store = MemoryCacheStore::default();
        store.set("state", b"verifier".to_vec(), 1).await.unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(store.take("state").await.unwrap(), None);
    }

    #[tokio::test]
    async fn del_removes_entry() {
        let store = MemoryCacheStore::default();
        store.set("k", b"v".to_vec(), 60).await.unwrap();
        store.del("k").await.unwrap();

        assert_eq!(store.get("k").await.unwrap(), None);
    }
}

mod memory_store;
mod redis_store;

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use memory_store::MemoryCacheStore;
use redis_store::RedisCacheStore;

pub const DEFAULT_PROFILE_CACHE_TTL: Duration = Duration::from_secs(60);
pub const OAUTH_STATE_TTL: Duration = Duration::from_secs(10 * 60);
/// Delay before the second delete issued by `invalidate_with_followup`.
pub const INVALIDATE_FOLLOWUP_DELAY: Duration = Duration::from_secs(1);

#[derive(Clone, Debug)]
enum CacheBackend {
    Memory(MemoryCacheStore),
    Redis(RedisCacheStore),
}

#[derive(Clone, Debug)]
pub struct CacheService {
    key_prefix: String,
    backend: CacheBackend,
    profile_ttl: Duration,
}

impl CacheService {
    pub fn in_memory(prefix: impl Into<String>) -> Self {
        Self {
            key_prefix: prefix.into(),
            backend: CacheBackend::Memory(MemoryCacheStore::default()),
            profile_ttl: DEFAULT_PROFILE_CACHE_TTL,
        }
    }

    pub fn redis(redis_url: &str, prefix: impl Into<String>) -> anyhow::Result<Self> {
        Ok(Self {
            key_prefix: prefix.into(),
            backend: CacheBackend::Redis(RedisCacheStore::from_url(redis_url)?),
            profile_ttl: DEFAULT_PROFILE_CACHE_TTL,
        })
    }

    pub fn is_redis_enabled(&self) -> bool {
        matches!(self.backend, CacheBackend::Redis(_))
    }

    pub fn configure_profile_ttl(&mut self, ttl: Duration) {
        self.profile_ttl = ttl.max(Duration::from_secs(1));
    }

    pub fn profile_ttl(&self) -> Duration {
        self.profile_ttl
    }

    pub fn key(&self, suffix: impl AsRef<str>) -> String {
        format!("{}:{}", self.key_prefix, suffix.as_ref())
    }

    pub async fn ping(&self) -> anyhow::Result<()> {
        match &self.backend {
            CacheBackend::Memory(_) => Ok(()),
            CacheBackend::Redis(store) => store.ping().await,
        }
    }

    pub async fn get_json<T>(&self, key: &str) -> anyhow::Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let value = match &self.backend {
            CacheBackend::Memory(store) => store.get(key).await,
            CacheBackend::Redis(store) => store.get(key).await,
        }?;

        decode(key, value)
    }

    pub async fn set_json<T>(&self, key: &str, value: &T, ttl: Duration) -> anyhow::Result<()>
    where
        T: Serialize,
    {
        let ttl_seconds = ttl.as_secs().max(1);
        let payload = serde_json::to_vec(value)
            .map_err(|e| anyhow::anyhow!("failed to serialize cache value for `{key}`: {e}"))?;

        match &self.backend {
            CacheBackend::Memory(store) => store.set(key, payload, ttl_seconds).await,
            CacheBackend::Redis(store) => store.set(key, payload, ttl_seconds).await,
        }
    }

    /// Remove and return a value; concurrent callers never both receive it.
    pub async fn take_json<T>(&self, key: &str) -> anyhow::Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let value = match &self.backend {
            CacheBackend::Memory(store) => store.take(key).await,
            CacheBackend::Redis(store) => store.take(key).await,
        }?;

        decode(key, value)
    }

    pub async fn del(&self, key: &str) -> anyhow::Result<()> {
        match &self.backend {
            CacheBackend::Memory(store) => store.del(key).await,
            CacheBackend::Redis(store) => store.del(key).await,
        }
    }

    /// Serve `key` from cache, or run `loader` and cache what it finds.
    ///
    /// A loader returning `None` leaves the key empty, so a row created
    /// later is seen on the next lookup.
    pub async fn get_or_load_json<T, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        loader: F,
    ) -> anyhow::Result<Option<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<Option<T>>>,
    {
        match self.get_json::<T>(key).await {
            Ok(Some(cached)) => return Ok(Some(cached)),
            Ok(None) => {}
            Err(e) => warn!(
                ?e,
                cache_key = key,
                "cache get failed; falling back to database"
            ),
        }

        let Some(loaded) = loader().await? else {
            return Ok(None);
        };

        if let Err(e) = self.set_json(key, &loaded, ttl).await {
            warn!(
                ?e,
                cache_key = key,
                "cache set failed; returning database value"
            );
        }

        Ok(Some(loaded))
    }

    /// Invalidate now and once more after `delay`.
    ///
    /// The second delete drops a value written by a reader that loaded the
    /// row before the write committed and filled the cache after the first delete.
    pub async fn invalidate_with_followup(&self, key: &str, delay: Duration) {
        self.invalidate(key).await;

        let cache = self.clone();
        let key = key.to_owned();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            cache.invalidate(&key).await;
        });
    }

    /// Drop a key, logging instead of failing when the backend is unavailable.
    pub async fn invalidate(&self, key: &str) {
        if let Err(e) = self.del(key).await {
            warn!(?e, cache_key = key, "cache invalidation failed");
        }
    }
}

fn decode<T>(key: &str, value: Option<Vec<u8>>) -> anyhow::Result<Option<T>>
where
    T: DeserializeOwned,
{
    match value {
        Some(bytes) => {
            let parsed = serde_json::from_slice(&bytes).map_err(|e| {
                anyhow::anyhow!("failed to deserialize cache value for `{key}`: {e}")
            })?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}

pub fn profile_key(cache: &CacheService, user_id: i64) -> String {
    cache.key(format!("profile:{user_id}"))
}

pub fn oauth_state_key(cache: &CacheService, state: &str) -> String {
    cache.key(format!("oauth:state:{state}"))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::{CacheService, oauth_state_key, profile_key};

    #[test]
    fn keys_carry_prefix() {
        let cache = CacheService::in_memory("questify:test");
        assert_eq!(profile_key(&cache, 5), "questify:test:profile:5");
        assert_eq!(oauth_state_key(&cache, "abc"), "questify:test:oauth:state:abc");
    }

    #[tokio::test]
    async fn loader_runs_once_while_cached() {
        let cache = CacheService::in_memory("questify:test");
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let calls = Arc::clone(&calls);
            let value = cache
                .get_or_load_json("k", Duration::from_secs(30), || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(Some(7_u32))
                })
                .await
                .unwrap();
            assert_eq!(value, Some(7));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);

        cache.invalidate("k").await;
        assert_eq!(cache.get_json::<u32>("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn take_json_removes_value() {
        let cache = CacheService::in_memory("questify:test");
        cache
            .set_json("k", &"pending".to_owned(), Duration::from_secs(30))
            .await
            .unwrap();

        assert_eq!(
            cache.take_json::<String>("k").await.unwrap().as_deref(),
            Some("pending")
        );
        assert_eq!(cache.take_json::<String>("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn missing_rows_are_not_cached() {
        let cache = CacheService::in_memory("questify:test");
        let ttl = Duration::from_secs(60);

        let first = cache
            .get_or_load_json("profile:5", ttl, || async { Ok(None::<u32>) })
            .await
            .unwrap();
        assert_eq!(first, None);

        let second = cache
            .get_or_load_json("profile:5", ttl, || async { Ok(Some(1_u32)) })
            .await
            .unwrap();
        assert_eq!(second, Some(1));

        let cached = cache
            .get_or_load_json("profile:5", ttl, || async { Ok(Some(2_u32)) })
            .await
            .unwrap();
        assert_eq!(cached, Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn followup_drops_late_refill() {
        let cache = CacheService::in_memory("questify:test");
        let ttl = Duration::from_secs(60);
        cache.set_json("profile:9", &10_u32, ttl).await.unwrap();

        cache
            .invalidate_with_followup("profile:9", Duration::from_secs(1))
            .await;
        assert_eq!(cache.get_json::<u32>("profile:9").await.unwrap(), None);

        // A reader that loaded before the write refills the stale value.
        cache.set_json("profile:9", &10_u32, ttl).await.unwrap();

        tokio::time::sleep(Duration::from_secs(2)).await;
        tokio::task::yield_now().await;
        assert_eq!(cache.get_json::<u32>("profile:9").await.unwrap(), None);
    }

    #[test]
    fn profile_ttl_has_floor() {
        let mut cache = CacheService::in_memory("questify:test");
        cache.configure_profile_ttl(Duration::ZERO);
        assert_eq!(cache.profile_ttl(), Duration::from_secs(1));
        assert!(!cache.is_redis_enabled());
    }
}

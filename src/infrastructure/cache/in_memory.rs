//! In-memory response cache using moka

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use moka::policy::EvictionPolicy;
use tracing::debug;

use crate::domain::cache::{CacheEntry, ResponseCache};
use crate::domain::DomainError;

/// Configuration for the in-memory response cache
#[derive(Debug, Clone)]
pub struct InMemoryCacheConfig {
    /// Maximum number of entries
    pub max_capacity: u64,
    /// Upper bound on entry lifetime used for background reclamation.
    /// Per-entry TTLs are still checked on every read.
    pub time_to_live: Option<Duration>,
}

impl Default for InMemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 1_000,
            time_to_live: Some(Duration::from_secs(300)),
        }
    }
}

impl InMemoryCacheConfig {
    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }

    pub fn with_time_to_live(mut self, ttl: Duration) -> Self {
        self.time_to_live = Some(ttl);
        self
    }
}

/// Thread-safe answer cache
///
/// - Fixed capacity with least-recently-used eviction
/// - TTL checked lazily on `get`
/// - moka's time-to-live reclaims expired entries in the background
#[derive(Debug)]
pub struct InMemoryResponseCache {
    cache: MokaCache<String, CacheEntry>,
    config: InMemoryCacheConfig,
}

impl InMemoryResponseCache {
    pub fn new() -> Self {
        Self::with_config(InMemoryCacheConfig::default())
    }

    pub fn with_config(config: InMemoryCacheConfig) -> Self {
        let mut builder = MokaCache::builder()
            .max_capacity(config.max_capacity)
            .eviction_policy(EvictionPolicy::lru());

        if let Some(ttl) = config.time_to_live.filter(|ttl| !ttl.is_zero()) {
            builder = builder.time_to_live(ttl);
        }

        Self {
            cache: builder.build(),
            config,
        }
    }

    pub fn config(&self) -> &InMemoryCacheConfig {
        &self.config
    }

    /// Applies pending evictions and access-order updates
    pub async fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks().await;
    }
}

impl Default for InMemoryResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResponseCache for InMemoryResponseCache {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, DomainError> {
        match self.cache.get(key).await {
            Some(entry) if entry.is_expired() => {
                debug!(key = %key, "Cache entry expired");
                self.cache.invalidate(key).await;
                Ok(None)
            }
            Some(entry) => Ok(Some(entry)),
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, entry: CacheEntry) -> Result<(), DomainError> {
        if entry.ttl.is_zero() {
            return Ok(());
        }

        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.cache.remove(key).await.is_some())
    }

    async fn len(&self) -> Result<usize, DomainError> {
        self.cache.run_pending_tasks().await;
        Ok(self.cache.entry_count() as usize)
    }
}

//! Cached answer entries

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

use crate::domain::inference::InferenceResult;

/// A completed answer stored in the response cache
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Cache key the entry was stored under
    pub key: String,
    /// The cached answer
    pub result: InferenceResult,
    /// Wall-clock creation time, for reporting
    pub created_at: DateTime<Utc>,
    /// Monotonic creation time, for expiry
    inserted_at: Instant,
    /// Time-to-live from creation
    pub ttl: Duration,
}

impl CacheEntry {
    pub fn new(key: impl Into<String>, result: InferenceResult, ttl: Duration) -> Self {
        Self {
            key: key.into(),
            result,
            created_at: Utc::now(),
            inserted_at: Instant::now(),
            ttl,
        }
    }

    pub fn age(&self) -> Duration {
        self.inserted_at.elapsed()
    }

    pub fn is_expired(&self) -> bool {
        self.age() >= self.ttl
    }

    /// Time left before the entry expires
    pub fn ttl_remaining(&self) -> Duration {
        self.ttl.saturating_sub(self.age())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> InferenceResult {
        InferenceResult::new("Paris", "test-model", Duration::from_millis(5))
    }

    #[test]
    fn test_fresh_entry_not_expired() {
        let entry = CacheEntry::new("k", result(), Duration::from_secs(60));
        assert!(!entry.is_expired());
        assert!(entry.ttl_remaining() <= Duration::from_secs(60));
    }

    #[test]
    fn test_zero_ttl_entry_is_expired() {
        let entry = CacheEntry::new("k", result(), Duration::ZERO);
        assert!(entry.is_expired());
        assert_eq!(entry.ttl_remaining(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let entry = CacheEntry::new("k", result(), Duration::from_secs(2));
        tokio::time::advance(Duration::from_secs(3)).await;
        assert!(entry.is_expired());
    }
}

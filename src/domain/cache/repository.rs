//! Response cache trait definition

use std::fmt::Debug;

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::CacheEntry;
use crate::domain::DomainError;

/// Cache of completed answers keyed by normalized query.
///
/// Implementations must be safe under concurrent use without external
/// locking. Racing `put`s for the same key are last-write-wins.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ResponseCache: Send + Sync + Debug {
    /// Returns the entry for `key` unless it is missing or expired
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>, DomainError>;

    /// Stores `entry` under `key`, replacing any previous entry
    async fn put(&self, key: &str, entry: CacheEntry) -> Result<(), DomainError>;

    /// Removes the entry for `key`
    async fn invalidate(&self, key: &str) -> Result<bool, DomainError>;

    /// Approximate number of live entries
    async fn len(&self) -> Result<usize, DomainError>;
}

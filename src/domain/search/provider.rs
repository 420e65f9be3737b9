use std::fmt::Debug;

use async_trait::async_trait;
use tokio::time::Instant;

use super::SearchHit;
use crate::domain::DomainError;

/// Abstract web-search capability.
///
/// Implementations classify failures as `DomainError::Transient` (timeouts,
/// 5xx-equivalents, connection resets) or `DomainError::Permanent` (malformed
/// query, provider rejection). `deadline` is absolute; implementations may
/// give up early but callers enforce it regardless.
#[async_trait]
pub trait SearchProvider: Send + Sync + Debug {
    /// Run one search, returning hits in provider order
    async fn search(
        &self,
        text: &str,
        max_results: usize,
        deadline: Instant,
    ) -> Result<Vec<SearchHit>, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}

//! Search retrieval client
//!
//! Wraps a [`SearchProvider`] with a per-call timeout and a bounded,
//! strictly sequential retry loop for transient failures.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, timeout_at, Instant};
use tracing::{debug, warn};

use crate::domain::search::sort_by_relevance;
use crate::domain::{DomainError, SearchHit, SearchProvider};
use crate::infrastructure::observability::record_retrieval_attempt;

/// Timeout and retry settings for retrieval
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// Upper bound for a single provider call
    pub call_timeout: Duration,
    /// Retries after the first attempt; total attempts = 1 + max_retries
    pub max_retries: u32,
    pub backoff_base: Duration,
    pub backoff_max: Duration,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(3),
            max_retries: 2,
            backoff_base: Duration::from_millis(100),
            backoff_max: Duration::from_secs(2),
        }
    }
}

impl RetrievalConfig {
    /// Delay before retry number `attempt` (0-based)
    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.backoff_base
            .saturating_mul(factor)
            .min(self.backoff_max)
    }
}

/// Runs one search against the provider, retrying transient failures
#[derive(Debug, Clone)]
pub struct RetrievalClient {
    provider: Arc<dyn SearchProvider>,
    config: RetrievalConfig,
}

impl RetrievalClient {
    pub fn new(provider: Arc<dyn SearchProvider>, config: RetrievalConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }

    /// Retrieve at most `max_results` hits ordered by relevance.
    ///
    /// `Transient` failures are retried with exponential backoff until the
    /// retry bound or `deadline` is reached; the last error is returned.
    /// `Permanent` failures are returned immediately.
    pub async fn retrieve(
        &self,
        text: &str,
        max_results: usize,
        deadline: Instant,
    ) -> Result<Vec<SearchHit>, DomainError> {
        let provider = self.provider.provider_name();
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match self.retrieve_once(text, max_results, deadline).await {
                Ok(hits) => {
                    debug!(provider, attempt, hits = hits.len(), "Search succeeded");
                    return Ok(hits);
                }
                Err(e @ DomainError::Transient { .. }) => {
                    warn!(provider, attempt, error = %e, "Transient search failure");
                    last_error = Some(e);

                    if attempt == self.config.max_retries {
                        break;
                    }

                    let backoff = self.config.backoff(attempt);
                    if Instant::now() + backoff >= deadline {
                        debug!(provider, attempt, "No time left for another attempt");
                        break;
                    }

                    sleep(backoff).await;
                }
                Err(e) => {
                    warn!(provider, attempt, error = %e, "Search failed permanently");
                    return Err(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| DomainError::transient(provider, "Retrieval retries exhausted")))
    }

    async fn retrieve_once(
        &self,
        text: &str,
        max_results: usize,
        deadline: Instant,
    ) -> Result<Vec<SearchHit>, DomainError> {
        let provider = self.provider.provider_name();
        let call_deadline = deadline.min(Instant::now() + self.config.call_timeout);
        let started = Instant::now();

        let result = match timeout_at(
            call_deadline,
            self.provider.search(text, max_results, call_deadline),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(DomainError::transient(provider, "Search call timed out")),
        };

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.kind().as_str(),
        };
        record_retrieval_attempt(provider, outcome, started.elapsed());

        let mut hits = result?;
        sort_by_relevance(&mut hits);
        hits.truncate(max_results);

        Ok(hits)
    }
}

//! Query entity and normalization

use std::time::Duration;

use crate::domain::cache::CacheKeyParams;
use crate::domain::DomainError;

/// Serving parameters attached to a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParams {
    /// Maximum number of search hits to retrieve
    pub max_results: usize,
    /// Maximum context length in characters
    pub context_budget: usize,
    /// Overall request timeout
    pub timeout: Duration,
}

impl QueryParams {
    pub fn new(max_results: usize, context_budget: usize, timeout: Duration) -> Self {
        Self {
            max_results,
            context_budget,
            timeout,
        }
    }
}

/// A normalized user request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    text: String,
    params: QueryParams,
}

impl Query {
    /// Normalizes the text and validates the parameters
    pub fn new(text: &str, params: QueryParams) -> Result<Self, DomainError> {
        let text = normalize_query(text);

        if text.is_empty() {
            return Err(DomainError::validation("Query cannot be empty"));
        }

        if params.max_results == 0 {
            return Err(DomainError::validation("max_results must be at least 1"));
        }

        if params.timeout.is_zero() {
            return Err(DomainError::validation("timeout must be greater than zero"));
        }

        Ok(Self { text, params })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    /// Key material for the response cache.
    ///
    /// The timeout is left out: it bounds how long we wait, not what we answer.
    pub fn cache_key_params(&self) -> CacheKeyParams {
        CacheKeyParams::new(self.text.clone())
            .with_component("max_results", self.params.max_results.to_string())
            .with_component("context_budget", self.params.context_budget.to_string())
    }
}

/// Trims, lowercases and collapses internal whitespace
pub fn normalize_query(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

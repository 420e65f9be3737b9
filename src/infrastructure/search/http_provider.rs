//! Generic JSON-over-HTTP search provider
//!
//! Request: `POST {endpoint}` with `{"query": "...", "max_results": n}`.
//! Response: `{"results": [{"url", "title", "snippet", "score"?}]}`.

use async_trait::async_trait;
use serde::Deserialize;
use tokio::time::Instant;

use crate::domain::{DomainError, SearchHit, SearchProvider};
use crate::infrastructure::http_client::{HttpClientTrait, HttpError};

const PROVIDER_NAME: &str = "http_search";

/// Search provider talking to a configurable JSON endpoint
#[derive(Debug)]
pub struct HttpSearchProvider<C: HttpClientTrait> {
    client: C,
    endpoint: String,
    auth_header: Option<String>,
}

impl<C: HttpClientTrait> HttpSearchProvider<C> {
    pub fn new(client: C, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            auth_header: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl AsRef<str>) -> Self {
        self.auth_header = Some(format!("Bearer {}", api_key.as_ref()));
        self
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        let mut headers = vec![("Content-Type", "application/json")];

        if let Some(ref auth) = self.auth_header {
            headers.push(("Authorization", auth.as_str()));
        }

        headers
    }

    fn map_error(err: HttpError) -> DomainError {
        if err.is_retryable() {
            DomainError::transient(PROVIDER_NAME, err.message)
        } else {
            DomainError::permanent(PROVIDER_NAME, err.message)
        }
    }

    fn parse_response(json: serde_json::Value) -> Result<Vec<SearchHit>, DomainError> {
        let response: SearchResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::permanent(PROVIDER_NAME, format!("Failed to parse response: {}", e))
        })?;

        Ok(response
            .results
            .into_iter()
            .enumerate()
            .map(|(rank, item)| SearchHit {
                url: item.url,
                title: item.title,
                snippet: item.snippet,
                rank,
                relevance: item.score,
            })
            .collect())
    }
}

#[async_trait]
impl<C: HttpClientTrait> SearchProvider for HttpSearchProvider<C> {
    async fn search(
        &self,
        text: &str,
        max_results: usize,
        deadline: Instant,
    ) -> Result<Vec<SearchHit>, DomainError> {
        let timeout = deadline.saturating_duration_since(Instant::now());

        if timeout.is_zero() {
            return Err(DomainError::transient(PROVIDER_NAME, "Deadline already elapsed"));
        }

        let body = serde_json::json!({
            "query": text,
            "max_results": max_results,
        });

        let response = self
            .client
            .post_json(&self.endpoint, self.headers(), &body, timeout)
            .await
            .map_err(Self::map_error)?;

        Self::parse_response(response)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResultItem>,
}

#[derive(Debug, Deserialize)]
struct SearchResultItem {
    url: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    score: Option<f64>,
}

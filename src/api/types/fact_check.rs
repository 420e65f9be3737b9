//! Fact-check endpoint request and response bodies

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{Claim, Verdict};
use crate::infrastructure::services::AnswerParams;

use super::error::ApiError;

/// `POST /v1/fact-check` request
#[derive(Debug, Clone, Deserialize)]
pub struct FactCheckRequest {
    pub claim: String,
    /// Free-form date the claim was made, e.g. `2023-05-01`
    #[serde(default)]
    pub date_claimed: Option<String>,
    #[serde(default)]
    pub max_results: Option<usize>,
    #[serde(default)]
    pub context_budget: Option<usize>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl FactCheckRequest {
    /// Build the claim, rejecting empty text and out-of-range overrides
    pub fn claim(&self) -> Result<Claim, ApiError> {
        if self.max_results == Some(0) {
            return Err(ApiError::bad_request("max_results must be at least 1")
                .with_param("max_results"));
        }

        if self.timeout_ms == Some(0) {
            return Err(ApiError::bad_request("timeout_ms must be greater than zero")
                .with_param("timeout_ms"));
        }

        Claim::new(&self.claim, self.date_claimed.as_deref())
            .map_err(|e| ApiError::bad_request(e.to_string()).with_param("claim"))
    }

    pub fn params(&self) -> AnswerParams {
        AnswerParams {
            max_results: self.max_results,
            context_budget: self.context_budget,
            timeout: self.timeout_ms.map(Duration::from_millis),
        }
    }
}

/// `POST /v1/fact-check` response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FactCheckResponse {
    pub verified: bool,
    pub confidence: f64,
    pub evidence: String,
    pub sources: Vec<String>,
}

impl From<Verdict> for FactCheckResponse {
    fn from(verdict: Verdict) -> Self {
        Self {
            verified: verdict.verified,
            confidence: verdict.confidence,
            evidence: verdict.evidence,
            sources: verdict.sources,
        }
    }
}

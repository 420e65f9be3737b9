//! Answer endpoint request and response bodies

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::InferenceResult;
use crate::infrastructure::services::AnswerParams;

use super::error::ApiError;

/// `POST /v1/answer` request
#[derive(Debug, Clone, Deserialize)]
pub struct AnswerRequest {
    pub query: String,
    #[serde(default)]
    pub max_results: Option<usize>,
    /// Context budget in characters
    #[serde(default)]
    pub context_budget: Option<usize>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl AnswerRequest {
    /// Reject out-of-range overrides before they reach the service
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.max_results == Some(0) {
            return Err(ApiError::bad_request("max_results must be at least 1")
                .with_param("max_results"));
        }

        if self.timeout_ms == Some(0) {
            return Err(ApiError::bad_request("timeout_ms must be greater than zero")
                .with_param("timeout_ms"));
        }

        Ok(())
    }

    pub fn params(&self) -> AnswerParams {
        AnswerParams {
            max_results: self.max_results,
            context_budget: self.context_budget,
            timeout: self.timeout_ms.map(Duration::from_millis),
        }
    }
}

/// `POST /v1/answer` response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerResponse {
    pub text: String,
    pub model: String,
    pub latency_ms: u64,
    pub sources: Vec<String>,
}

impl From<InferenceResult> for AnswerResponse {
    fn from(result: InferenceResult) -> Self {
        Self {
            text: result.text,
            model: result.model,
            latency_ms: result.latency_ms,
            sources: result.sources,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request: AnswerRequest =
            serde_json::from_str(r#"{"query": "capital of france"}"#).unwrap();

        let params = request.params();
        assert!(params.max_results.is_none());
        assert!(params.timeout.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_request_overrides() {
        let request: AnswerRequest = serde_json::from_str(
            r#"{"query": "q", "max_results": 3, "context_budget": 500, "timeout_ms": 1500}"#,
        )
        .unwrap();

        let params = request.params();
        assert_eq!(params.max_results, Some(3));
        assert_eq!(params.context_budget, Some(500));
        assert_eq!(params.timeout, Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let request: AnswerRequest =
            serde_json::from_str(r#"{"query": "q", "max_results": 0}"#).unwrap();
        let err = request.validate().unwrap_err();
        assert_eq!(err.response.error.param.as_deref(), Some("max_results"));

        let request: AnswerRequest =
            serde_json::from_str(r#"{"query": "q", "timeout_ms": 0}"#).unwrap();
        assert!(request.validate().is_err());
    }
}

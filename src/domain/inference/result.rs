use std::time::Duration;

use serde::{Deserialize, Serialize};

/// The answer produced for one query execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceResult {
    /// Generated answer text
    pub text: String,
    /// Identifier of the model that produced the answer
    pub model: String,
    /// Time spent generating, in milliseconds
    pub latency_ms: u64,
    /// Source URLs of the context the answer was generated from
    #[serde(default)]
    pub sources: Vec<String>,
}

impl InferenceResult {
    pub fn new(text: impl Into<String>, model: impl Into<String>, latency: Duration) -> Self {
        Self {
            text: text.into(),
            model: model.into(),
            latency_ms: latency.as_millis() as u64,
            sources: Vec::new(),
        }
    }

    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }
}

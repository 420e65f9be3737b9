use async_trait::async_trait;
use tokio::time::Instant;

use crate::domain::{DomainError, InferenceEngine};

/// Development engine that answers with the rendered prompt.
///
/// Lets the whole pipeline run (search, aggregation, caching) without a
/// model server.
#[derive(Debug, Clone)]
pub struct EchoEngine {
    model: String,
    parallelism: usize,
}

impl EchoEngine {
    pub fn new() -> Self {
        Self {
            model: "echo".to_string(),
            parallelism: 1,
        }
    }

    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }
}

impl Default for EchoEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceEngine for EchoEngine {
    async fn generate(&self, prompt: &str, _deadline: Instant) -> Result<String, DomainError> {
        Ok(prompt.to_string())
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    fn max_parallelism(&self) -> usize {
        self.parallelism
    }
}

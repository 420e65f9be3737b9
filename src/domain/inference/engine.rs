use std::fmt::Debug;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::domain::DomainError;

/// Trait for the loaded model (local model server, embedded runtime, ...)
///
/// Failures are `DomainError::ResourceExhausted` when the model ran out of
/// memory or similar limits, `DomainError::Model` for malformed input or
/// output, anything else for transport problems. None of them are retried.
#[async_trait]
pub trait InferenceEngine: Send + Sync + Debug {
    /// Generate a completion for `prompt`, giving up at `deadline`
    async fn generate(&self, prompt: &str, deadline: Instant) -> Result<String, DomainError>;

    /// Identifier reported in answers
    fn model_id(&self) -> &str;

    /// Number of `generate` calls the engine can execute at once.
    /// 1 means the engine is single-threaded and calls must be serialized.
    fn max_parallelism(&self) -> usize {
        1
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Mock engine recording prompts, call counts and observed concurrency
    #[derive(Debug)]
    pub struct MockInferenceEngine {
        response: Result<String, DomainError>,
        delay: Option<Duration>,
        parallelism: usize,
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        prompts: Mutex<Vec<String>>,
    }

    impl MockInferenceEngine {
        pub fn new() -> Self {
            Self {
                response: Ok("mock answer".to_string()),
                delay: None,
                parallelism: 1,
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn with_response(mut self, response: impl Into<String>) -> Self {
            self.response = Ok(response.into());
            self
        }

        pub fn with_error(mut self, error: DomainError) -> Self {
            self.response = Err(error);
            self
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn with_parallelism(mut self, parallelism: usize) -> Self {
            self.parallelism = parallelism;
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        /// Highest number of overlapping `generate` calls seen
        pub fn max_observed_concurrency(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }

        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    impl Default for MockInferenceEngine {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl InferenceEngine for MockInferenceEngine {
        async fn generate(&self, prompt: &str, _deadline: Instant) -> Result<String, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());

            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.response.clone()
        }

        fn model_id(&self) -> &str {
            "mock-model"
        }

        fn max_parallelism(&self) -> usize {
            self.parallelism
        }
    }
}

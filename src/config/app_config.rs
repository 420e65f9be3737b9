use std::time::Duration;

use serde::Deserialize;

use crate::domain::DomainError;
use crate::infrastructure::cache::InMemoryCacheConfig;
use crate::infrastructure::concurrency::ConcurrencyConfig;
use crate::infrastructure::context::ContextAggregatorConfig;
use crate::infrastructure::inference::{InferenceAdapterConfig, InferenceEngineConfig};
use crate::infrastructure::observability::MetricsConfig;
use crate::infrastructure::search::{RetrievalConfig, SearchProviderConfig};
use crate::infrastructure::services::AnswerConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub serving: ServingConfig,
    #[serde(default)]
    pub search: SearchProviderConfig,
    #[serde(default)]
    pub inference: InferenceEngineConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Tunables of the answer pipeline (`serving.*`)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServingConfig {
    pub cache_capacity: u64,
    /// 0 disables the response cache
    pub cache_ttl_secs: u64,
    pub retrieval_slot_count: usize,
    pub inference_slot_count: usize,
    /// Requests allowed to wait on one slot pool
    pub slot_queue_depth: usize,
    pub retrieval_max_retries: u32,
    pub retrieval_backoff_base_ms: u64,
    pub retrieval_backoff_max_ms: u64,
    pub retrieval_call_timeout_ms: u64,
    pub inference_call_timeout_ms: u64,
    pub inference_queue_capacity: usize,
    /// Context budget in characters
    pub context_budget: usize,
    pub context_min_fragment: usize,
    pub default_max_results: usize,
    pub default_request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for ServingConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 1_000,
            cache_ttl_secs: 300,
            retrieval_slot_count: 8,
            inference_slot_count: 2,
            slot_queue_depth: 64,
            retrieval_max_retries: 2,
            retrieval_backoff_base_ms: 100,
            retrieval_backoff_max_ms: 2_000,
            retrieval_call_timeout_ms: 3_000,
            inference_call_timeout_ms: 30_000,
            inference_queue_capacity: 64,
            context_budget: 4_000,
            context_min_fragment: 40,
            default_max_results: 5,
            default_request_timeout_ms: 30_000,
        }
    }
}

impl ServingConfig {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.retrieval_slot_count == 0 || self.inference_slot_count == 0 {
            return Err(DomainError::configuration(
                "serving.retrieval_slot_count and serving.inference_slot_count must be at least 1",
            ));
        }

        if self.default_max_results == 0 {
            return Err(DomainError::configuration(
                "serving.default_max_results must be at least 1",
            ));
        }

        let timeouts = [
            ("default_request_timeout_ms", self.default_request_timeout_ms),
            ("retrieval_call_timeout_ms", self.retrieval_call_timeout_ms),
            ("inference_call_timeout_ms", self.inference_call_timeout_ms),
        ];

        if let Some((name, _)) = timeouts.iter().find(|(_, ms)| *ms == 0) {
            return Err(DomainError::configuration(format!(
                "serving.{} must be greater than zero",
                name
            )));
        }

        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn cache_config(&self) -> InMemoryCacheConfig {
        InMemoryCacheConfig {
            max_capacity: self.cache_capacity,
            time_to_live: Some(self.cache_ttl()),
        }
    }

    pub fn concurrency_config(&self) -> ConcurrencyConfig {
        ConcurrencyConfig {
            retrieval_slots: self.retrieval_slot_count,
            inference_slots: self.inference_slot_count,
            max_waiters: self.slot_queue_depth,
        }
    }

    pub fn retrieval_config(&self) -> RetrievalConfig {
        RetrievalConfig {
            call_timeout: Duration::from_millis(self.retrieval_call_timeout_ms),
            max_retries: self.retrieval_max_retries,
            backoff_base: Duration::from_millis(self.retrieval_backoff_base_ms),
            backoff_max: Duration::from_millis(self.retrieval_backoff_max_ms),
        }
    }

    pub fn aggregator_config(&self) -> ContextAggregatorConfig {
        ContextAggregatorConfig {
            min_fragment_len: self.context_min_fragment,
        }
    }

    pub fn adapter_config(&self) -> InferenceAdapterConfig {
        InferenceAdapterConfig {
            max_workers: self.inference_slot_count,
            queue_capacity: self.inference_queue_capacity,
            call_timeout: Duration::from_millis(self.inference_call_timeout_ms),
        }
    }

    pub fn answer_config(&self) -> AnswerConfig {
        AnswerConfig {
            cache_ttl: self.cache_ttl(),
            default_max_results: self.default_max_results,
            default_context_budget: self.context_budget,
            default_timeout: Duration::from_millis(self.default_request_timeout_ms),
            ..AnswerConfig::default()
        }
    }
}

impl AppConfig {
    /// Layers `config/default`, `config/local` and `APP__*` environment variables
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

use std::sync::Arc;

use serde::Deserialize;

use super::echo::EchoEngine;
use super::openai_compatible::OpenAiCompatibleEngine;
use crate::domain::{DomainError, InferenceEngine, PromptTemplate};
use crate::infrastructure::http_client::HttpClient;

/// Supported inference engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferenceEngineKind {
    /// Local model server with an OpenAI-compatible chat-completions API
    OpenaiCompatible,
    /// Returns the prompt as the answer
    #[default]
    Echo,
}

/// Inference engine settings (`inference.*`)
#[derive(Debug, Clone, Deserialize)]
pub struct InferenceEngineConfig {
    #[serde(default)]
    pub engine: InferenceEngineKind,
    /// Model server root, required for `openai_compatible`
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Concurrent generations the model server supports
    #[serde(default = "default_max_parallelism")]
    pub max_parallelism: usize,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Overrides the built-in prompt template
    #[serde(default)]
    pub prompt_template: Option<String>,
}

fn default_model() -> String {
    "local-model".to_string()
}

fn default_max_parallelism() -> usize {
    1
}

impl Default for InferenceEngineConfig {
    fn default() -> Self {
        Self {
            engine: InferenceEngineKind::default(),
            base_url: None,
            model: default_model(),
            api_key: None,
            max_parallelism: default_max_parallelism(),
            system_prompt: None,
            temperature: None,
            max_tokens: None,
            prompt_template: None,
        }
    }
}

impl InferenceEngineConfig {
    /// The configured prompt template, or the built-in one
    pub fn prompt_template(&self) -> Result<PromptTemplate, DomainError> {
        match self.prompt_template {
            Some(ref template) => PromptTemplate::parse(template.as_str()),
            None => Ok(PromptTemplate::default()),
        }
    }
}

/// Factory for creating inference engines
#[derive(Debug)]
pub struct InferenceEngineFactory;

impl InferenceEngineFactory {
    pub fn create(config: &InferenceEngineConfig) -> Result<Arc<dyn InferenceEngine>, DomainError> {
        if config.max_parallelism == 0 {
            return Err(DomainError::configuration(
                "inference.max_parallelism must be at least 1",
            ));
        }

        match config.engine {
            InferenceEngineKind::OpenaiCompatible => {
                let base_url = config.base_url.as_deref().ok_or_else(|| {
                    DomainError::configuration(
                        "inference.base_url is required for the openai_compatible engine",
                    )
                })?;

                let mut engine = OpenAiCompatibleEngine::with_base_url(
                    HttpClient::new(),
                    config.model.as_str(),
                    base_url,
                )
                .with_parallelism(config.max_parallelism);

                if let Some(ref api_key) = config.api_key {
                    engine = engine.with_api_key(api_key);
                }

                if let Some(ref system_prompt) = config.system_prompt {
                    engine = engine.with_system_prompt(system_prompt.as_str());
                }

                if let Some(temperature) = config.temperature {
                    engine = engine.with_temperature(temperature);
                }

                if let Some(max_tokens) = config.max_tokens {
                    engine = engine.with_max_tokens(max_tokens);
                }

                Ok(Arc::new(engine))
            }
            InferenceEngineKind::Echo => Ok(Arc::new(
                EchoEngine::new().with_parallelism(config.max_parallelism),
            )),
        }
    }
}

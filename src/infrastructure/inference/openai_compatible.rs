use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::domain::{DomainError, InferenceEngine};
use crate::infrastructure::http_client::{HttpClientTrait, HttpError, HttpErrorKind};

const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Status some local model servers use when the model cannot allocate memory
const INSUFFICIENT_STORAGE: u16 = 507;

/// Engine backed by a locally hosted model server speaking the OpenAI
/// chat-completions protocol (vLLM, llama.cpp server, Ollama, ...)
#[derive(Debug)]
pub struct OpenAiCompatibleEngine<C: HttpClientTrait> {
    client: C,
    base_url: String,
    model: String,
    auth_header: Option<String>,
    system_prompt: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    parallelism: usize,
}

impl<C: HttpClientTrait> OpenAiCompatibleEngine<C> {
    pub fn new(client: C, model: impl Into<String>) -> Self {
        Self::with_base_url(client, model, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            auth_header: None,
            system_prompt: None,
            temperature: None,
            max_tokens: None,
            parallelism: 1,
        }
    }

    pub fn with_api_key(mut self, api_key: impl AsRef<str>) -> Self {
        self.auth_header = Some(format!("Bearer {}", api_key.as_ref()));
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Number of requests the model server handles concurrently
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        let mut headers = vec![("Content-Type", "application/json")];

        if let Some(ref auth) = self.auth_header {
            headers.push(("Authorization", auth.as_str()));
        }

        headers
    }

    fn build_request(&self, prompt: &str) -> serde_json::Value {
        let mut messages = Vec::with_capacity(2);

        if let Some(ref system) = self.system_prompt {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: Some(system.clone()),
            });
        }

        messages.push(ChatMessage {
            role: "user".to_string(),
            content: Some(prompt.to_string()),
        });

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "stream": false,
        });

        if let Some(temperature) = self.temperature {
            body["temperature"] = serde_json::json!(temperature);
        }

        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        body
    }

    fn parse_response(json: serde_json::Value) -> Result<String, DomainError> {
        let response: ChatResponse = serde_json::from_value(json)
            .map_err(|e| DomainError::model(format!("Failed to parse response: {}", e)))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| DomainError::model("No content in response"))
    }
}

/// Maps an HTTP failure onto the engine's failure modes
fn map_http_error(err: HttpError) -> DomainError {
    if err.message.to_lowercase().contains("out of memory") {
        return DomainError::resource_exhausted(err.message);
    }

    match err.kind {
        HttpErrorKind::Status(INSUFFICIENT_STORAGE) => DomainError::resource_exhausted(err.message),
        HttpErrorKind::Status(status) if (400..500).contains(&status) => {
            DomainError::model(err.message)
        }
        HttpErrorKind::Decode => DomainError::model(err.message),
        _ => DomainError::inference_failed(err.message),
    }
}

#[async_trait]
impl<C: HttpClientTrait> InferenceEngine for OpenAiCompatibleEngine<C> {
    async fn generate(&self, prompt: &str, deadline: Instant) -> Result<String, DomainError> {
        let timeout = deadline.saturating_duration_since(Instant::now());

        if timeout.is_zero() {
            return Err(DomainError::inference_failed("Deadline already elapsed"));
        }

        let body = self.build_request(prompt);
        let response = self
            .client
            .post_json(&self.chat_completions_url(), self.headers(), &body, timeout)
            .await
            .map_err(map_http_error)?;

        Self::parse_response(response)
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    fn max_parallelism(&self) -> usize {
        self.parallelism
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

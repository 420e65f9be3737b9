use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// What went wrong with an HTTP exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpErrorKind {
    /// The request did not complete before its timeout
    Timeout,
    /// The connection could not be established
    Connect,
    /// The connection failed while sending or receiving
    Transport,
    /// The server answered with a non-success status
    Status(u16),
    /// The response body was not valid JSON of the expected shape
    Decode,
}

/// HTTP failure with enough detail to decide on retries
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct HttpError {
    pub kind: HttpErrorKind,
    pub message: String,
}

impl HttpError {
    pub fn new(kind: HttpErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self.kind {
            HttpErrorKind::Status(status) => Some(status),
            _ => None,
        }
    }

    /// Timeouts, connection problems, 5xx and 429 may succeed on a later attempt
    pub fn is_retryable(&self) -> bool {
        match self.kind {
            HttpErrorKind::Timeout | HttpErrorKind::Connect | HttpErrorKind::Transport => true,
            HttpErrorKind::Status(status) => status >= 500 || status == 429,
            HttpErrorKind::Decode => false,
        }
    }

    fn from_reqwest(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            HttpErrorKind::Timeout
        } else if err.is_connect() {
            HttpErrorKind::Connect
        } else if err.is_decode() {
            HttpErrorKind::Decode
        } else {
            HttpErrorKind::Transport
        };

        Self::new(kind, format!("Request failed: {}", err))
    }
}

/// Trait for HTTP client operations (for mocking)
#[async_trait]
pub trait HttpClientTrait: Send + Sync + std::fmt::Debug {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<serde_json::Value, HttpError>;
}

/// Real HTTP client using reqwest
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<serde_json::Value, HttpError> {
        let mut request = self.client.post(url).timeout(timeout);

        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = request
            .json(body)
            .send()
            .await
            .map_err(HttpError::from_reqwest)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            return Err(HttpError::new(
                HttpErrorKind::Status(status.as_u16()),
                format!("HTTP {}: {}", status, error_body),
            ));
        }

        response.json().await.map_err(|e| {
            HttpError::new(
                HttpErrorKind::Decode,
                format!("Failed to parse response: {}", e),
            )
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_retryable_classification() {
        assert!(HttpError::new(HttpErrorKind::Timeout, "").is_retryable());
        assert!(HttpError::new(HttpErrorKind::Connect, "").is_retryable());
        assert!(HttpError::new(HttpErrorKind::Status(503), "").is_retryable());
        assert!(HttpError::new(HttpErrorKind::Status(429), "").is_retryable());
        assert!(!HttpError::new(HttpErrorKind::Status(400), "").is_retryable());
        assert!(!HttpError::new(HttpErrorKind::Decode, "").is_retryable());
    }

    #[tokio::test]
    async fn test_post_json_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(header("x-test", "1"))
            .and(body_json(json!({"query": "rust"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .mount(&server)
            .await;

        let client = HttpClient::new();
        let response = client
            .post_json(
                &format!("{}/search", server.uri()),
                vec![("x-test", "1")],
                &json!({"query": "rust"}),
                Duration::from_secs(5),
            )
            .await
            .unwrap();

        assert_eq!(response["ok"], true);
    }

    #[tokio::test]
    async fn test_post_json_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = HttpClient::new()
            .post_json(&server.uri(), vec![], &json!({}), Duration::from_secs(5))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(502));
        assert!(err.is_retryable());
        assert!(err.message.contains("bad gateway"));
    }

    #[tokio::test]
    async fn test_post_json_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let err = HttpClient::new()
            .post_json(&server.uri(), vec![], &json!({}), Duration::from_millis(50))
            .await
            .unwrap_err();

        assert_eq!(err.kind, HttpErrorKind::Timeout);
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_post_json_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = HttpClient::new()
            .post_json(&server.uri(), vec![], &json!({}), Duration::from_secs(5))
            .await
            .unwrap_err();

        assert_eq!(err.kind, HttpErrorKind::Decode);
        assert!(!err.is_retryable());
    }
}

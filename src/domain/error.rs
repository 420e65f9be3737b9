use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Error classification surfaced to callers of the answer pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Retryable external failure
    Transient,
    /// Non-retryable external failure
    Permanent,
    /// Capacity exhausted, the caller should retry later
    Overloaded,
    /// The model call failed
    InferenceFailed,
    /// The model hit its resource limits for this call
    ResourceExhausted,
    /// The response cache could not be used
    CacheUnavailable,
    /// The query or its parameters were rejected
    InvalidQuery,
    /// Misconfiguration or broken internal invariant
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transient => "transient",
            Self::Permanent => "permanent",
            Self::Overloaded => "overloaded",
            Self::InferenceFailed => "inference_failed",
            Self::ResourceExhausted => "resource_exhausted",
            Self::CacheUnavailable => "cache_unavailable",
            Self::InvalidQuery => "invalid_query",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core domain errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Transient failure: {provider} - {message}")]
    Transient { provider: String, message: String },

    #[error("Permanent failure: {provider} - {message}")]
    Permanent { provider: String, message: String },

    #[error("Overloaded: {message}")]
    Overloaded { message: String },

    #[error("Inference failed: {message}")]
    InferenceFailed { message: String },

    #[error("Model error: {message}")]
    Model { message: String },

    #[error("Resource exhausted: {message}")]
    ResourceExhausted { message: String },

    #[error("Cache unavailable: {message}")]
    CacheUnavailable { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn transient(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transient {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn permanent(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Permanent {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn overloaded(message: impl Into<String>) -> Self {
        Self::Overloaded {
            message: message.into(),
        }
    }

    pub fn inference_failed(message: impl Into<String>) -> Self {
        Self::InferenceFailed {
            message: message.into(),
        }
    }

    pub fn model(message: impl Into<String>) -> Self {
        Self::Model {
            message: message.into(),
        }
    }

    pub fn resource_exhausted(message: impl Into<String>) -> Self {
        Self::ResourceExhausted {
            message: message.into(),
        }
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::CacheUnavailable {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Classifies the error for callers of the answer pipeline.
    ///
    /// `Model` errors are reported as `InferenceFailed`: callers only need to
    /// know that the model call failed, not why.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::InvalidQuery,
            Self::Transient { .. } => ErrorKind::Transient,
            Self::Permanent { .. } => ErrorKind::Permanent,
            Self::Overloaded { .. } => ErrorKind::Overloaded,
            Self::InferenceFailed { .. } | Self::Model { .. } => ErrorKind::InferenceFailed,
            Self::ResourceExhausted { .. } => ErrorKind::ResourceExhausted,
            Self::CacheUnavailable { .. } => ErrorKind::CacheUnavailable,
            Self::Configuration { .. } | Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Whether an external call failing with this error may be attempted again
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

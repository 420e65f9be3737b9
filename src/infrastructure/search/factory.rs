//! Search provider factory for runtime selection

use std::sync::Arc;

use serde::Deserialize;

use crate::domain::{DomainError, SearchProvider};
use crate::infrastructure::http_client::HttpClient;

use super::disabled::DisabledSearchProvider;
use super::http_provider::HttpSearchProvider;

/// Supported search providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchProviderKind {
    /// Generic JSON-over-HTTP search endpoint
    Http,
    /// No search; every query gets an empty context
    #[default]
    Disabled,
}

impl std::fmt::Display for SearchProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchProviderKind::Http => write!(f, "http"),
            SearchProviderKind::Disabled => write!(f, "disabled"),
        }
    }
}

impl std::str::FromStr for SearchProviderKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "http" => Ok(SearchProviderKind::Http),
            "disabled" | "none" => Ok(SearchProviderKind::Disabled),
            _ => Err(DomainError::configuration(format!(
                "Unknown search provider: {}. Valid providers: http, disabled",
                s
            ))),
        }
    }
}

/// Search provider settings (`search.*`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchProviderConfig {
    #[serde(default)]
    pub provider: SearchProviderKind,
    /// Endpoint URL, required for `http`
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Sent as a bearer token when present
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Factory for creating search providers
#[derive(Debug)]
pub struct SearchProviderFactory;

impl SearchProviderFactory {
    pub fn create(config: &SearchProviderConfig) -> Result<Arc<dyn SearchProvider>, DomainError> {
        match config.provider {
            SearchProviderKind::Http => {
                let endpoint = config.endpoint.as_deref().ok_or_else(|| {
                    DomainError::configuration("search.endpoint is required for the http provider")
                })?;

                let mut provider = HttpSearchProvider::new(HttpClient::new(), endpoint);
                if let Some(ref api_key) = config.api_key {
                    provider = provider.with_api_key(api_key);
                }

                Ok(Arc::new(provider))
            }
            SearchProviderKind::Disabled => Ok(Arc::new(DisabledSearchProvider)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_from_str() {
        assert_eq!("http".parse::<SearchProviderKind>().unwrap(), SearchProviderKind::Http);
        assert_eq!("HTTP".parse::<SearchProviderKind>().unwrap(), SearchProviderKind::Http);
        assert_eq!(
            "none".parse::<SearchProviderKind>().unwrap(),
            SearchProviderKind::Disabled
        );
        assert!("duckduckgo".parse::<SearchProviderKind>().is_err());
    }

    #[test]
    fn test_provider_kind_display() {
        assert_eq!(SearchProviderKind::Http.to_string(), "http");
        assert_eq!(SearchProviderKind::Disabled.to_string(), "disabled");
    }

    #[test]
    fn test_create_disabled() {
        let provider = SearchProviderFactory::create(&SearchProviderConfig::default()).unwrap();
        assert_eq!(provider.provider_name(), "disabled");
    }

    #[test]
    fn test_create_http() {
        let config = SearchProviderConfig {
            provider: SearchProviderKind::Http,
            endpoint: Some("http://localhost:9000/search".to_string()),
            api_key: Some("key".to_string()),
        };

        let provider = SearchProviderFactory::create(&config).unwrap();
        assert_eq!(provider.provider_name(), "http_search");
    }

    #[test]
    fn test_http_requires_endpoint() {
        let config = SearchProviderConfig {
            provider: SearchProviderKind::Http,
            ..Default::default()
        };

        let result = SearchProviderFactory::create(&config);
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }
}

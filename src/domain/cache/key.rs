//! Cache key generation

use std::collections::BTreeMap;
use std::fmt::Debug;

use sha2::{Digest, Sha256};

/// Trait for generating cache keys from input data
pub trait CacheKeyGenerator: Send + Sync + Debug {
    /// Generates a cache key from the given components
    fn generate(&self, params: &CacheKeyParams) -> String;

    /// Generates a key with a namespace prefix
    fn generate_with_namespace(&self, namespace: &str, params: &CacheKeyParams) -> String {
        format!("{}:{}", namespace, self.generate(params))
    }
}

/// Parameters for cache key generation
#[derive(Debug, Clone, Default)]
pub struct CacheKeyParams {
    /// Primary identifier (the normalized query text)
    pub primary: String,
    /// Secondary components (sorted for consistency)
    pub components: BTreeMap<String, String>,
}

impl CacheKeyParams {
    pub fn new(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            components: BTreeMap::new(),
        }
    }

    pub fn with_component(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.components.insert(key.into(), value.into());
        self
    }
}

/// Default cache key generator, optionally hashing the key material with SHA-256
#[derive(Debug, Clone, Default)]
pub struct DefaultKeyGenerator {
    use_short_hash: bool,
}

impl DefaultKeyGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produces fixed-length hex digests instead of the raw key material
    pub fn with_short_hash(mut self) -> Self {
        self.use_short_hash = true;
        self
    }

    fn hash_string(input: &str) -> String {
        let digest = Sha256::digest(input.as_bytes());
        hex::encode(&digest[..16])
    }
}

impl CacheKeyGenerator for DefaultKeyGenerator {
    fn generate(&self, params: &CacheKeyParams) -> String {
        let mut parts = vec![params.primary.clone()];

        for (k, v) in &params.components {
            parts.push(format!("{}={}", k, v));
        }

        // Unit separator keeps query text containing ':' from colliding with components
        let combined = parts.join("\u{1f}");

        if self.use_short_hash {
            Self::hash_string(&combined)
        } else {
            combined
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Outcome of verifying a claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub verified: bool,
    /// Model confidence in `verified`, within `0.0..=1.0`
    pub confidence: f64,
    pub evidence: String,
    pub sources: Vec<String>,
}

/// Shape the model is asked to reply with
#[derive(Debug, Deserialize)]
struct RawVerdict {
    #[serde(alias = "verified")]
    is_verified: bool,
    #[serde(default)]
    confidence: f64,
    #[serde(default, alias = "evidence")]
    evidence_summary: String,
    #[serde(default, alias = "sources")]
    source_urls: Vec<String>,
}

impl Verdict {
    /// Parse a model reply. Tolerates prose or code fences around the JSON object.
    pub fn parse(text: &str) -> Result<Self, DomainError> {
        let json = match (text.find('{'), text.rfind('}')) {
            (Some(start), Some(end)) if start < end => &text[start..=end],
            _ => return Err(DomainError::model("Model reply contains no JSON object")),
        };

        let raw: RawVerdict = serde_json::from_str(json)
            .map_err(|e| DomainError::model(format!("Malformed verdict: {}", e)))?;

        let confidence = if raw.confidence.is_nan() {
            0.0
        } else {
            raw.confidence.clamp(0.0, 1.0)
        };

        Ok(Self {
            verified: raw.is_verified,
            confidence,
            evidence: raw.evidence_summary.trim().to_string(),
            sources: raw.source_urls,
        })
    }

    /// Unverified, zero-confidence verdict reported when verification could not complete
    pub fn fallback(reason: impl std::fmt::Display) -> Self {
        Self {
            verified: false,
            confidence: 0.0,
            evidence: format!("Verification failed: {}", reason),
            sources: Vec::new(),
        }
    }
}

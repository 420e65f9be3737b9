//! Search hit model

use serde::{Deserialize, Serialize};

/// One external search result item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Source URL
    pub url: String,
    /// Result title
    pub title: String,
    /// Text snippet
    pub snippet: String,
    /// Position in the provider's response (0 = first)
    pub rank: usize,
    /// Provider-reported relevance, higher is better
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance: Option<f64>,
}

impl SearchHit {
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        snippet: impl Into<String>,
        rank: usize,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            snippet: snippet.into(),
            rank,
            relevance: None,
        }
    }

    pub fn with_relevance(mut self, relevance: f64) -> Self {
        self.relevance = Some(relevance);
        self
    }
}

/// Orders hits by relevance descending, keeping provider order for ties.
///
/// Hits without a relevance score sort after scored ones.
pub fn sort_by_relevance(hits: &mut [SearchHit]) {
    hits.sort_by(|a, b| {
        let a = a.relevance.unwrap_or(f64::NEG_INFINITY);
        let b = b.relevance.unwrap_or(f64::NEG_INFINITY);
        b.total_cmp(&a)
    });
}

//! Context aggregation
//!
//! Turns ranked search hits into a [`Context`] whose rendered length never
//! exceeds the character budget. Lower-ranked hits are the first to go.

use std::collections::HashSet;

use reqwest::Url;
use tracing::debug;

use crate::domain::context::FRAGMENT_SEPARATOR;
use crate::domain::search::sort_by_relevance;
use crate::domain::{Context, ContextFragment, SearchHit};

/// Aggregation settings
#[derive(Debug, Clone)]
pub struct ContextAggregatorConfig {
    /// Smallest truncated fragment worth keeping, in characters.
    /// Does not apply to the first fragment.
    pub min_fragment_len: usize,
}

impl Default for ContextAggregatorConfig {
    fn default() -> Self {
        Self {
            min_fragment_len: 40,
        }
    }
}

/// Stateless hit-to-context aggregator
#[derive(Debug, Clone, Default)]
pub struct ContextAggregator {
    config: ContextAggregatorConfig,
}

impl ContextAggregator {
    pub fn new(config: ContextAggregatorConfig) -> Self {
        Self { config }
    }

    /// Build a context from `hits` within `budget` characters.
    ///
    /// Hits are deduplicated by normalized URL (first occurrence wins) and
    /// taken in relevance order. Aggregation stops at the first snippet that
    /// does not fit, after truncating it if enough room is left.
    pub fn build(&self, hits: &[SearchHit], budget: usize) -> Context {
        let mut ordered = hits.to_vec();
        sort_by_relevance(&mut ordered);

        let separator_len = FRAGMENT_SEPARATOR.chars().count();
        let mut seen = HashSet::new();
        let mut fragments: Vec<ContextFragment> = Vec::new();
        let mut used = 0;

        for hit in ordered {
            if !seen.insert(normalize_url(&hit.url)) {
                debug!(url = %hit.url, "Skipping duplicate source");
                continue;
            }

            let text = normalize_whitespace(&hit.snippet);
            if text.is_empty() {
                continue;
            }

            let separator = if fragments.is_empty() { 0 } else { separator_len };
            let room = budget.saturating_sub(used + separator);
            let len = text.chars().count();

            if len <= room {
                used += separator + len;
                fragments.push(fragment(&hit, text));
                continue;
            }

            let truncated = truncate_at_word_boundary(&text, room);
            let kept = truncated.chars().count();
            let minimum = if fragments.is_empty() {
                1
            } else {
                self.config.min_fragment_len.max(1)
            };

            if kept >= minimum {
                used += separator + kept;
                fragments.push(fragment(&hit, truncated));
            } else {
                debug!(url = %hit.url, kept, minimum, "Skipping short trailing fragment");
            }

            break;
        }

        debug!(fragments = fragments.len(), used, budget, "Context built");

        Context::from_fragments(fragments, budget).unwrap_or_else(|_| Context::empty(budget))
    }
}

fn fragment(hit: &SearchHit, text: String) -> ContextFragment {
    ContextFragment {
        url: hit.url.clone(),
        title: hit.title.clone(),
        text,
        rank: hit.rank,
    }
}

/// Canonical form of a source URL used for deduplication.
///
/// Scheme and host are lowercased, a leading `www.` is dropped, the
/// fragment and any trailing slash are removed. Unparseable URLs are
/// compared trimmed and lowercased.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();

    let Ok(url) = Url::parse(trimmed) else {
        return trimmed.trim_end_matches('/').to_lowercase();
    };

    let host = url.host_str().unwrap_or_default();
    let host = host.strip_prefix("www.").unwrap_or(host);

    let mut normalized = format!("{}://{}", url.scheme(), host);

    if let Some(port) = url.port() {
        normalized.push_str(&format!(":{}", port));
    }

    normalized.push_str(url.path().trim_end_matches('/'));

    if let Some(query) = url.query() {
        normalized.push('?');
        normalized.push_str(query);
    }

    normalized
}

/// Trim both ends and collapse internal whitespace
fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cut `text` to at most `max_chars` characters, preferring the last word
/// boundary. A single word longer than `max_chars` is cut mid-word.
fn truncate_at_word_boundary(text: &str, max_chars: usize) -> String {
    let mut chars = text.char_indices();

    let Some((cut, next)) = chars.nth(max_chars) else {
        return text.to_string();
    };

    let prefix = &text[..cut];

    if next.is_whitespace() {
        return prefix.trim_end().to_string();
    }

    match prefix.rfind(char::is_whitespace) {
        Some(boundary) => prefix[..boundary].trim_end().to_string(),
        None => prefix.to_string(),
    }
}

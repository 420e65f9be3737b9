//! Prompt template rendering
//!
//! Templates reference the query and the search context with
//! `${var:query}` and `${var:context}`. Unknown variables are rejected when
//! the template is parsed.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::context::Context;
use crate::domain::query::Query;
use crate::domain::DomainError;

static VARIABLE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{var:([a-zA-Z0-9][-a-zA-Z0-9_]*)\}").unwrap());

const KNOWN_VARIABLES: [&str; 2] = ["query", "context"];

/// Text substituted for `${var:context}` when no search results were usable
pub const EMPTY_CONTEXT_PLACEHOLDER: &str = "No search results available.";

pub const DEFAULT_PROMPT_TEMPLATE: &str = "You are a careful research assistant. \
Answer the question using the search results below.\n\
If the search results do not contain the answer, say that the available evidence \
is inconclusive and only answer from general knowledge if you are confident.\n\n\
Question: ${var:query}\n\n\
Search results:\n${var:context}\n\n\
Answer:";

/// A parsed prompt template
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    content: String,
}

impl PromptTemplate {
    /// Parse a template, requiring the query variable and rejecting unknown ones
    pub fn parse(content: impl Into<String>) -> Result<Self, DomainError> {
        let content = content.into();
        let mut has_query = false;

        for cap in VARIABLE_PATTERN.captures_iter(&content) {
            let name = &cap[1];

            if !KNOWN_VARIABLES.contains(&name) {
                return Err(DomainError::configuration(format!(
                    "Unknown prompt variable: {}",
                    name
                )));
            }

            has_query |= name == "query";
        }

        if !has_query {
            return Err(DomainError::configuration(
                "Prompt template must reference ${var:query}",
            ));
        }

        Ok(Self { content })
    }

    /// Render the prompt for one query and its context
    pub fn render(&self, query: &Query, context: &Context) -> String {
        let context_text = if context.is_empty() {
            EMPTY_CONTEXT_PLACEHOLDER.to_string()
        } else {
            context.render()
        };

        VARIABLE_PATTERN
            .replace_all(&self.content, |cap: &regex::Captures| match &cap[1] {
                "query" => query.text().to_string(),
                _ => context_text.clone(),
            })
            .into_owned()
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            content: DEFAULT_PROMPT_TEMPLATE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::context::ContextFragment;
    use crate::domain::query::QueryParams;
    use std::time::Duration;

    fn query() -> Query {
        Query::new(
            "What is the capital of France?",
            QueryParams::new(5, 500, Duration::from_secs(5)),
        )
        .unwrap()
    }

    #[test]
    fn test_default_template_parses() {
        assert!(PromptTemplate::parse(DEFAULT_PROMPT_TEMPLATE).is_ok());
    }

    #[test]
    fn test_render_substitutes_query_and_context() {
        let template = PromptTemplate::parse("Q: ${var:query}\nC: ${var:context}").unwrap();
        let context = Context::from_fragments(
            vec![ContextFragment {
                url: "https://example.com/france".to_string(),
                title: "France profile".to_string(),
                text: "capital: Paris".to_string(),
                rank: 0,
            }],
            500,
        )
        .unwrap();

        let prompt = template.render(&query(), &context);
        assert_eq!(prompt, "Q: what is the capital of france?\nC: capital: Paris");
    }

    #[test]
    fn test_render_empty_context_placeholder() {
        let prompt = PromptTemplate::default().render(&query(), &Context::empty(500));
        assert!(prompt.contains(EMPTY_CONTEXT_PLACEHOLDER));
        assert!(prompt.contains("what is the capital of france?"));
    }

    #[test]
    fn test_unknown_variable_rejected() {
        let result = PromptTemplate::parse("${var:query} ${var:language}");
        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[test]
    fn test_missing_query_variable_rejected() {
        let result = PromptTemplate::parse("Context only: ${var:context}");
        assert!(result.is_err());
    }
}

//! Context domain - the bounded aggregation of search hits fed to the model

use crate::domain::DomainError;

/// Separator placed between fragments in the rendered context
pub const FRAGMENT_SEPARATOR: &str = "\n\n";

/// A snippet selected for the context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextFragment {
    pub url: String,
    pub title: String,
    pub text: String,
    /// Provider rank of the hit the fragment came from
    pub rank: usize,
}

/// Ordered fragments for one query, bounded by a character budget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    fragments: Vec<ContextFragment>,
    budget: usize,
}

impl Context {
    pub fn empty(budget: usize) -> Self {
        Self {
            fragments: Vec::new(),
            budget,
        }
    }

    /// Builds a context, rejecting fragment sets whose rendering exceeds the budget
    pub fn from_fragments(
        fragments: Vec<ContextFragment>,
        budget: usize,
    ) -> Result<Self, DomainError> {
        let context = Self { fragments, budget };
        let len = context.len();

        if len > budget {
            return Err(DomainError::internal(format!(
                "Context length {} exceeds budget {}",
                len, budget
            )));
        }

        Ok(context)
    }

    pub fn fragments(&self) -> &[ContextFragment] {
        &self.fragments
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Rendered length in characters, separators included
    pub fn len(&self) -> usize {
        let text: usize = self.fragments.iter().map(|f| f.text.chars().count()).sum();
        let separators = self.fragments.len().saturating_sub(1) * FRAGMENT_SEPARATOR.len();
        text + separators
    }

    pub fn render(&self) -> String {
        self.fragments
            .iter()
            .map(|f| f.text.as_str())
            .collect::<Vec<_>>()
            .join(FRAGMENT_SEPARATOR)
    }

    /// Source URLs in fragment order
    pub fn sources(&self) -> Vec<String> {
        self.fragments.iter().map(|f| f.url.clone()).collect()
    }
}

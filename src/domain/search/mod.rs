//! Search domain - hits and the abstract search capability

mod hit;
mod provider;

pub use hit::{sort_by_relevance, SearchHit};
pub use provider::SearchProvider;

#[cfg(test)]
pub use provider::mock::MockSearchProvider;

//! Context aggregation infrastructure

mod aggregator;

pub use aggregator::{normalize_url, ContextAggregator, ContextAggregatorConfig};

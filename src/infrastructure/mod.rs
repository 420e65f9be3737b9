//! Infrastructure layer - search, inference, caching and concurrency implementations

pub mod cache;
pub mod concurrency;
pub mod context;
pub mod http_client;
pub mod inference;
pub mod logging;
pub mod observability;
pub mod search;
pub mod services;

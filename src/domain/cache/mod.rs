//! Cache domain - answer cache abstraction and key generation

mod entry;
mod key;
mod repository;

pub use entry::CacheEntry;
pub use key::{CacheKeyGenerator, CacheKeyParams, DefaultKeyGenerator};
pub use repository::ResponseCache;

#[cfg(test)]
pub use repository::MockResponseCache;

//! Domain layer - core types and traits of the answer pipeline

pub mod cache;
pub mod context;
pub mod error;
pub mod factcheck;
pub mod inference;
pub mod query;
pub mod search;

pub use cache::{CacheEntry, ResponseCache};
pub use context::{Context, ContextFragment};
pub use error::{DomainError, ErrorKind};
pub use factcheck::{Claim, Verdict};
pub use inference::{InferenceEngine, InferenceResult, PromptTemplate};
pub use query::{Query, QueryParams};
pub use search::{SearchHit, SearchProvider};

//! Search infrastructure - providers and the retrying retrieval client

mod disabled;
mod factory;
mod http_provider;
mod retrieval_client;

pub use disabled::DisabledSearchProvider;
pub use factory::{SearchProviderConfig, SearchProviderFactory, SearchProviderKind};
pub use http_provider::HttpSearchProvider;
pub use retrieval_client::{RetrievalClient, RetrievalConfig};

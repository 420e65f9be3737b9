use async_trait::async_trait;
use tokio::time::Instant;

use crate::domain::{DomainError, SearchHit, SearchProvider};

/// Provider used when no search backend is configured; answers come from
/// the model alone
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledSearchProvider;

#[async_trait]
impl SearchProvider for DisabledSearchProvider {
    async fn search(
        &self,
        _text: &str,
        _max_results: usize,
        _deadline: Instant,
    ) -> Result<Vec<SearchHit>, DomainError> {
        Ok(Vec::new())
    }

    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

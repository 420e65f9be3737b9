//! Application state for shared services

use std::sync::Arc;

use crate::domain::{Claim, DomainError, InferenceResult, Verdict};
use crate::infrastructure::concurrency::{SlotClass, SlotUsage};
use crate::infrastructure::services::{AnswerParams, AnswerService, FactCheckService};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub answer_service: Arc<dyn AnswerServiceTrait>,
    pub fact_check_service: Arc<dyn FactCheckServiceTrait>,
}

impl AppState {
    pub fn new(
        answer_service: Arc<dyn AnswerServiceTrait>,
        fact_check_service: Arc<dyn FactCheckServiceTrait>,
    ) -> Self {
        Self {
            answer_service,
            fact_check_service,
        }
    }
}

/// Trait for answer service operations
#[async_trait::async_trait]
pub trait AnswerServiceTrait: Send + Sync {
    async fn answer(
        &self,
        text: &str,
        params: AnswerParams,
    ) -> Result<InferenceResult, DomainError>;

    fn model_id(&self) -> &str;

    fn search_provider(&self) -> &'static str;

    /// Current usage of the retrieval and inference pools
    fn slot_usage(&self) -> Vec<SlotUsage>;
}

#[async_trait::async_trait]
impl AnswerServiceTrait for AnswerService {
    async fn answer(
        &self,
        text: &str,
        params: AnswerParams,
    ) -> Result<InferenceResult, DomainError> {
        AnswerService::answer(self, text, params).await
    }

    fn model_id(&self) -> &str {
        AnswerService::model_id(self)
    }

    fn search_provider(&self) -> &'static str {
        AnswerService::search_provider(self)
    }

    fn slot_usage(&self) -> Vec<SlotUsage> {
        let controller = self.controller();
        vec![
            controller.usage(SlotClass::Retrieval),
            controller.usage(SlotClass::Inference),
        ]
    }
}

/// Trait for fact-check operations
#[async_trait::async_trait]
pub trait FactCheckServiceTrait: Send + Sync {
    async fn verify(&self, claim: &Claim, params: AnswerParams) -> Result<Verdict, DomainError>;
}

#[async_trait::async_trait]
impl FactCheckServiceTrait for FactCheckService {
    async fn verify(&self, claim: &Claim, params: AnswerParams) -> Result<Verdict, DomainError> {
        FactCheckService::verify(self, claim, params).await
    }
}

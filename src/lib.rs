//! PMP Search Inference
//!
//! Search-augmented inference serving core:
//! - Retrieval from a pluggable web search provider with retries and deadlines
//! - Context aggregation under a character budget
//! - Queued, parallelism-capped model inference
//! - Response caching and bounded concurrency for external calls
//! - Structured claim verification on top of the same pipeline

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use infrastructure::{
    cache::InMemoryResponseCache,
    concurrency::ConcurrencyController,
    context::ContextAggregator,
    inference::{InferenceAdapter, InferenceEngineFactory},
    search::{RetrievalClient, SearchProviderFactory},
    services::{AnswerService, AnswerServiceDeps, FactCheckService},
};
use tracing::info;

/// Wire the answer pipeline from configuration.
///
/// Spawns the inference workers, so it must run inside a tokio runtime.
pub fn build_answer_service(config: &AppConfig) -> anyhow::Result<AnswerService> {
    let serving = &config.serving;
    serving.validate()?;

    let provider = SearchProviderFactory::create(&config.search)?;
    let engine = InferenceEngineFactory::create(&config.inference)?;
    let template = config.inference.prompt_template()?;

    info!(
        search_provider = provider.provider_name(),
        model = %engine.model_id(),
        retrieval_slots = serving.retrieval_slot_count,
        inference_slots = serving.inference_slot_count,
        "Building answer service"
    );

    let deps = AnswerServiceDeps {
        cache: Arc::new(InMemoryResponseCache::with_config(serving.cache_config())),
        retrieval: RetrievalClient::new(provider, serving.retrieval_config()),
        aggregator: ContextAggregator::new(serving.aggregator_config()),
        adapter: InferenceAdapter::new(engine, template, serving.adapter_config()),
        controller: Arc::new(ConcurrencyController::new(serving.concurrency_config())?),
    };

    Ok(AnswerService::new(deps, serving.answer_config()))
}

/// Create the application state with default configuration
pub fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default())
}

/// Create the application state with custom configuration
pub fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let answers = Arc::new(build_answer_service(config)?);
    let fact_checks = Arc::new(FactCheckService::new(answers.clone()));
    Ok(AppState::new(answers, fact_checks))
}

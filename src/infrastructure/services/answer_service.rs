//! Answer service - the per-request orchestration of the serving core
//!
//! cache lookup -> retrieval (retrieval slot) -> context aggregation ->
//! inference (inference slot) -> cache write -> result

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, instrument, warn, Span};

use crate::domain::cache::{CacheKeyGenerator, CacheKeyParams, DefaultKeyGenerator};
use crate::domain::{
    CacheEntry, Context, DomainError, InferenceResult, Query, QueryParams, ResponseCache,
};
use crate::infrastructure::concurrency::{ConcurrencyController, InFlightToken, SlotClass};
use crate::infrastructure::context::ContextAggregator;
use crate::infrastructure::inference::InferenceAdapter;
use crate::infrastructure::observability::{
    record_answer, record_cache_error, record_cache_lookup, record_overload,
};
use crate::infrastructure::search::RetrievalClient;

/// Orchestration settings and request defaults
#[derive(Debug, Clone)]
pub struct AnswerConfig {
    /// Namespace prefix for cache keys
    pub namespace: String,
    /// Lifetime of cached answers; zero disables the cache
    pub cache_ttl: Duration,
    pub default_max_results: usize,
    pub default_context_budget: usize,
    pub default_timeout: Duration,
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            namespace: "answers".to_string(),
            cache_ttl: Duration::from_secs(300),
            default_max_results: 5,
            default_context_budget: 4_000,
            default_timeout: Duration::from_secs(30),
        }
    }
}

/// Per-request overrides; unset fields fall back to [`AnswerConfig`]
#[derive(Debug, Clone, Default)]
pub struct AnswerParams {
    pub max_results: Option<usize>,
    pub context_budget: Option<usize>,
    pub timeout: Option<Duration>,
}

/// Collaborators of the answer service
pub struct AnswerServiceDeps {
    pub cache: Arc<dyn ResponseCache>,
    pub retrieval: RetrievalClient,
    pub aggregator: ContextAggregator,
    pub adapter: InferenceAdapter,
    pub controller: Arc<ConcurrencyController>,
}

/// Serves answers for search-augmented queries
#[derive(Debug)]
pub struct AnswerService {
    cache: Arc<dyn ResponseCache>,
    retrieval: RetrievalClient,
    aggregator: ContextAggregator,
    adapter: InferenceAdapter,
    controller: Arc<ConcurrencyController>,
    key_generator: DefaultKeyGenerator,
    config: AnswerConfig,
}

impl AnswerService {
    pub fn new(deps: AnswerServiceDeps, config: AnswerConfig) -> Self {
        Self {
            cache: deps.cache,
            retrieval: deps.retrieval,
            aggregator: deps.aggregator,
            adapter: deps.adapter,
            controller: deps.controller,
            key_generator: DefaultKeyGenerator::new().with_short_hash(),
            config,
        }
    }

    pub fn config(&self) -> &AnswerConfig {
        &self.config
    }

    pub fn controller(&self) -> &Arc<ConcurrencyController> {
        &self.controller
    }

    pub fn model_id(&self) -> &str {
        self.adapter.model_id()
    }

    pub fn search_provider(&self) -> &'static str {
        self.retrieval.provider_name()
    }

    fn cache_enabled(&self) -> bool {
        !self.config.cache_ttl.is_zero()
    }

    /// Resolve request overrides against the configured defaults
    pub fn query_params(&self, params: &AnswerParams) -> QueryParams {
        QueryParams::new(
            params.max_results.unwrap_or(self.config.default_max_results),
            params
                .context_budget
                .unwrap_or(self.config.default_context_budget),
            params.timeout.unwrap_or(self.config.default_timeout),
        )
    }

    /// Cache key for a query
    pub fn cache_key(&self, query: &Query) -> String {
        self.namespaced_key(&self.config.namespace, &query.cache_key_params())
    }

    /// Answer `text`, using the cache when possible.
    ///
    /// Search failures never fail the request; the model then answers
    /// without context. Lack of capacity yields `Overloaded`, model
    /// failures `InferenceFailed` or `ResourceExhausted`.
    #[instrument(skip(self, params), fields(cache_key = tracing::field::Empty))]
    pub async fn answer(
        &self,
        text: &str,
        params: AnswerParams,
    ) -> Result<InferenceResult, DomainError> {
        let started = Instant::now();

        let outcome = self.answer_inner(text, &params, started).await;

        let label = match &outcome {
            Ok((_, true)) => "cached",
            Ok((_, false)) => "answered",
            Err(e) => e.kind().as_str(),
        };
        record_answer(label, started.elapsed());

        outcome.map(|(result, _)| result)
    }

    async fn answer_inner(
        &self,
        text: &str,
        params: &AnswerParams,
        started: Instant,
    ) -> Result<(InferenceResult, bool), DomainError> {
        let query = Query::new(text, self.query_params(params))?;
        let deadline = started + query.params().timeout;
        let key = self.cache_key(&query);
        Span::current().record("cache_key", key.as_str());

        if let Some(result) = self.lookup(&key).await {
            info!("Serving cached answer");
            return Ok((result, true));
        }

        let context = self.gather_context(&query, deadline).await?;

        let result = {
            let _token = self.acquire(SlotClass::Inference, deadline).await?;
            self.adapter.infer(&query, &context, deadline).await?
        };

        self.store(&key, &result).await;

        info!(model = %result.model, latency_ms = result.latency_ms, "Answer generated");
        Ok((result, false))
    }

    /// Namespaced cache key for arbitrary key material
    pub(crate) fn namespaced_key(&self, namespace: &str, params: &CacheKeyParams) -> String {
        self.key_generator.generate_with_namespace(namespace, params)
    }

    /// Cached result for `key`; always a miss when caching is disabled
    pub(crate) async fn lookup(&self, key: &str) -> Option<InferenceResult> {
        if !self.cache_enabled() {
            return None;
        }

        self.cached(key).await.map(|entry| entry.result)
    }

    /// Best-effort cache write
    pub(crate) async fn store(&self, key: &str, result: &InferenceResult) {
        if !self.cache_enabled() {
            return;
        }

        let entry = CacheEntry::new(key, result.clone(), self.config.cache_ttl);

        if let Err(e) = self.cache.put(key, entry).await {
            warn!(error = %e, kind = "cache_unavailable", "Failed to cache answer");
            record_cache_error("put");
        }
    }

    /// Retrieve under a retrieval slot and aggregate. Search failures yield
    /// an empty context; only lack of capacity is an error.
    pub(crate) async fn gather_context(
        &self,
        query: &Query,
        deadline: Instant,
    ) -> Result<Context, DomainError> {
        let hits = {
            let _token = self.acquire(SlotClass::Retrieval, deadline).await?;

            match self
                .retrieval
                .retrieve(query.text(), query.params().max_results, deadline)
                .await
            {
                Ok(hits) => hits,
                Err(e) => {
                    warn!(error = %e, kind = %e.kind(), "Search failed, answering without context");
                    Vec::new()
                }
            }
        };

        let context = self
            .aggregator
            .build(&hits, query.params().context_budget);
        debug!(
            hits = hits.len(),
            fragments = context.fragments().len(),
            context_len = context.len(),
            "Context assembled"
        );

        Ok(context)
    }

    /// Run a rendered prompt under an inference slot
    pub(crate) async fn generate(
        &self,
        prompt: String,
        context: &Context,
        deadline: Instant,
    ) -> Result<InferenceResult, DomainError> {
        let _token = self.acquire(SlotClass::Inference, deadline).await?;
        self.adapter.infer_prompt(prompt, context, deadline).await
    }

    async fn cached(&self, key: &str) -> Option<CacheEntry> {
        match self.cache.get(key).await {
            Ok(entry) => {
                record_cache_lookup(entry.is_some());
                entry
            }
            Err(e) => {
                warn!(error = %e, kind = "cache_unavailable", "Cache lookup failed, treating as miss");
                record_cache_error("get");
                None
            }
        }
    }

    async fn acquire(
        &self,
        class: SlotClass,
        deadline: Instant,
    ) -> Result<InFlightToken, DomainError> {
        self.controller.acquire(class, deadline).await.inspect_err(|_| {
            record_overload(&class.to_string());
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::MockResponseCache;
    use crate::domain::inference::MockInferenceEngine;
    use crate::domain::search::MockSearchProvider;
    use crate::domain::{ErrorKind, PromptTemplate, SearchHit};
    use crate::infrastructure::cache::InMemoryResponseCache;
    use crate::infrastructure::concurrency::ConcurrencyConfig;
    use crate::infrastructure::context::ContextAggregatorConfig;
    use crate::infrastructure::inference::InferenceAdapterConfig;
    use crate::infrastructure::search::RetrievalConfig;

    const FRANCE_URL: &str = "https://example.com/france";

    struct Harness {
        provider: Arc<MockSearchProvider>,
        engine: Arc<MockInferenceEngine>,
        controller: Arc<ConcurrencyController>,
        service: AnswerService,
    }

    fn retrieval_config() -> RetrievalConfig {
        RetrievalConfig {
            call_timeout: Duration::from_millis(100),
            max_retries: 2,
            backoff_base: Duration::from_millis(10),
            backoff_max: Duration::from_millis(50),
        }
    }

    fn harness_with_cache(
        provider: MockSearchProvider,
        engine: MockInferenceEngine,
        cache: Arc<dyn ResponseCache>,
        cache_ttl: Duration,
    ) -> Harness {
        let provider = Arc::new(provider);
        let engine = Arc::new(engine);
        let controller = Arc::new(
            ConcurrencyController::new(ConcurrencyConfig {
                retrieval_slots: 2,
                inference_slots: 1,
                max_waiters: 8,
            })
            .unwrap(),
        );

        let adapter = InferenceAdapter::new(
            engine.clone(),
            PromptTemplate::default(),
            InferenceAdapterConfig {
                max_workers: 1,
                queue_capacity: 8,
                call_timeout: Duration::from_secs(5),
            },
        );

        let service = AnswerService::new(
            AnswerServiceDeps {
                cache,
                retrieval: RetrievalClient::new(provider.clone(), retrieval_config()),
                aggregator: ContextAggregator::new(ContextAggregatorConfig {
                    min_fragment_len: 10,
                }),
                adapter,
                controller: controller.clone(),
            },
            AnswerConfig {
                cache_ttl,
                default_timeout: Duration::from_secs(10),
                ..Default::default()
            },
        );

        Harness {
            provider,
            engine,
            controller,
            service,
        }
    }

    fn harness(
        provider: MockSearchProvider,
        engine: MockInferenceEngine,
        cache_ttl: Duration,
    ) -> Harness {
        harness_with_cache(
            provider,
            engine,
            Arc::new(InMemoryResponseCache::new()),
            cache_ttl,
        )
    }

    fn france_provider() -> MockSearchProvider {
        MockSearchProvider::new().with_hits(vec![SearchHit::new(
            FRANCE_URL,
            "France - country profile",
            "France facts. capital: Paris",
            0,
        )])
    }

    fn ttl() -> Duration {
        Duration::from_secs(60)
    }

    #[tokio::test]
    async fn test_capital_of_france_then_cache_hit() {
        let h = harness(
            france_provider(),
            MockInferenceEngine::new().with_response("Paris"),
            ttl(),
        );

        let result = h
            .service
            .answer("What is the capital of France?", AnswerParams::default())
            .await
            .unwrap();

        assert_eq!(result.text, "Paris");
        assert_eq!(result.sources, vec![FRANCE_URL]);
        assert!(h.engine.prompts()[0].contains("capital: Paris"));
        assert_eq!(h.provider.call_count(), 1);
        assert_eq!(h.engine.call_count(), 1);

        let again = h
            .service
            .answer("  what is the   CAPITAL of france? ", AnswerParams::default())
            .await
            .unwrap();

        assert_eq!(again, result);
        assert_eq!(h.provider.call_count(), 1);
        assert_eq!(h.engine.call_count(), 1);
    }

    #[tokio::test]
    async fn test_zero_ttl_bypasses_cache() {
        let h = harness(france_provider(), MockInferenceEngine::new(), Duration::ZERO);

        for _ in 0..2 {
            h.service
                .answer("capital of france", AnswerParams::default())
                .await
                .unwrap();
        }

        assert_eq!(h.provider.call_count(), 2);
        assert_eq!(h.engine.call_count(), 2);
    }

    #[tokio::test]
    async fn test_different_params_are_cached_separately() {
        let h = harness(france_provider(), MockInferenceEngine::new(), ttl());

        h.service
            .answer("capital of france", AnswerParams::default())
            .await
            .unwrap();
        h.service
            .answer(
                "capital of france",
                AnswerParams {
                    max_results: Some(1),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        h.service
            .answer(
                "capital of france",
                AnswerParams {
                    timeout: Some(Duration::from_secs(3)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(h.engine.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_timing_out_search_answers_with_empty_context() {
        let h = harness(
            MockSearchProvider::new().with_delay(Duration::from_secs(60)),
            MockInferenceEngine::new().with_response("inconclusive"),
            ttl(),
        );

        let result = h
            .service
            .answer("capital of france", AnswerParams::default())
            .await
            .unwrap();

        assert_eq!(h.provider.call_count(), 3);
        assert_eq!(h.engine.call_count(), 1);
        assert!(h.engine.prompts()[0].contains("No search results available."));
        assert!(result.sources.is_empty());
    }

    #[tokio::test]
    async fn test_permanent_search_failure_degrades() {
        let h = harness(
            MockSearchProvider::new().with_error(DomainError::permanent("mock", "rejected")),
            MockInferenceEngine::new(),
            ttl(),
        );

        let result = h
            .service
            .answer("capital of france", AnswerParams::default())
            .await;

        tokio_test::assert_ok!(&result);
        assert_eq!(h.provider.call_count(), 1);
        assert!(result.unwrap().sources.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_saturated_inference_is_overloaded() {
        let h = harness(france_provider(), MockInferenceEngine::new(), ttl());
        let _held = h
            .controller
            .acquire(SlotClass::Inference, Instant::now() + Duration::from_secs(60))
            .await
            .unwrap();

        let start = Instant::now();
        let result = h
            .service
            .answer(
                "capital of france",
                AnswerParams {
                    timeout: Some(Duration::from_millis(200)),
                    ..Default::default()
                },
            )
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Overloaded);
        assert!(start.elapsed() < Duration::from_millis(250));
        assert_eq!(h.engine.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_request_releases_slots() {
        let h = Arc::new(harness(
            france_provider(),
            MockInferenceEngine::new().with_delay(Duration::from_secs(5)),
            ttl(),
        ));

        let request = {
            let h = h.clone();
            tokio::spawn(async move {
                h.service
                    .answer("capital of france", AnswerParams::default())
                    .await
            })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(h.controller.available(SlotClass::Inference), 0);

        request.abort();
        let _ = request.await;

        assert_eq!(h.controller.available(SlotClass::Inference), 1);
        assert_eq!(h.controller.available(SlotClass::Retrieval), 2);
    }

    #[tokio::test]
    async fn test_resource_exhausted_is_surfaced() {
        let h = harness(
            france_provider(),
            MockInferenceEngine::new().with_error(DomainError::resource_exhausted("out of memory")),
            ttl(),
        );

        let err = h
            .service
            .answer("capital of france", AnswerParams::default())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ResourceExhausted);
    }

    #[tokio::test]
    async fn test_model_error_is_inference_failed_and_not_cached() {
        let h = harness(
            france_provider(),
            MockInferenceEngine::new().with_error(DomainError::model("bad output")),
            ttl(),
        );

        for _ in 0..2 {
            let err = h
                .service
                .answer("capital of france", AnswerParams::default())
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InferenceFailed);
        }

        assert_eq!(h.engine.call_count(), 2);
    }

    #[tokio::test]
    async fn test_cache_failures_never_fail_the_request() {
        let mut cache = MockResponseCache::new();
        cache
            .expect_get()
            .times(1)
            .returning(|_| Err(DomainError::cache("connection refused")));
        cache
            .expect_put()
            .times(1)
            .returning(|_, _| Err(DomainError::cache("connection refused")));

        let h = harness_with_cache(
            france_provider(),
            MockInferenceEngine::new().with_response("Paris"),
            Arc::new(cache),
            ttl(),
        );

        let result = h
            .service
            .answer("capital of france", AnswerParams::default())
            .await
            .unwrap();

        assert_eq!(result.text, "Paris");
    }

    #[tokio::test]
    async fn test_zero_ttl_never_touches_cache() {
        let mut cache = MockResponseCache::new();
        cache.expect_get().never();
        cache.expect_put().never();

        let h = harness_with_cache(
            france_provider(),
            MockInferenceEngine::new(),
            Arc::new(cache),
            Duration::ZERO,
        );

        assert!(h
            .service
            .answer("capital of france", AnswerParams::default())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_empty_query_is_invalid() {
        let h = harness(france_provider(), MockInferenceEngine::new(), ttl());

        let err = h
            .service
            .answer("   ", AnswerParams::default())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidQuery);
        assert_eq!(h.provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_query_params_defaults() {
        let h = harness(france_provider(), MockInferenceEngine::new(), ttl());

        let params = h.service.query_params(&AnswerParams {
            context_budget: Some(100),
            ..Default::default()
        });

        assert_eq!(params.max_results, 5);
        assert_eq!(params.context_budget, 100);
        assert_eq!(params.timeout, Duration::from_secs(10));
    }
}

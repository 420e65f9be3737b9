//! Inference engine adapter
//!
//! Owns the long-lived engine instance and feeds it through a bounded FIFO
//! work queue. A fixed set of workers (one for single-threaded engines)
//! pulls jobs off the queue, so the engine never sees more concurrent calls
//! than it supports.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, error, warn};

use crate::domain::{Context, DomainError, InferenceEngine, InferenceResult, PromptTemplate, Query};
use crate::infrastructure::observability::record_inference;

/// Adapter settings
#[derive(Debug, Clone)]
pub struct InferenceAdapterConfig {
    /// Upper bound on workers, normally the inference slot count
    pub max_workers: usize,
    /// Jobs that may wait in the queue
    pub queue_capacity: usize,
    /// Upper bound for a single engine call
    pub call_timeout: Duration,
}

impl Default for InferenceAdapterConfig {
    fn default() -> Self {
        Self {
            max_workers: 2,
            queue_capacity: 64,
            call_timeout: Duration::from_secs(30),
        }
    }
}

type Reply = oneshot::Sender<Result<String, DomainError>>;

struct Job {
    prompt: String,
    deadline: Instant,
    reply: Reply,
}

/// Message-passing front end to the model
#[derive(Debug)]
pub struct InferenceAdapter {
    engine: Arc<dyn InferenceEngine>,
    template: PromptTemplate,
    sender: mpsc::Sender<Job>,
    workers: usize,
}

impl InferenceAdapter {
    /// Start the adapter's workers. Must be called from within a tokio runtime.
    pub fn new(
        engine: Arc<dyn InferenceEngine>,
        template: PromptTemplate,
        config: InferenceAdapterConfig,
    ) -> Self {
        let workers = engine.max_parallelism().min(config.max_workers).max(1);
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let receiver = Arc::new(Mutex::new(receiver));

        for worker_id in 0..workers {
            tokio::spawn(worker_loop(
                worker_id,
                engine.clone(),
                receiver.clone(),
                config.call_timeout,
            ));
        }

        debug!(model = %engine.model_id(), workers, "Inference adapter started");

        Self {
            engine,
            template,
            sender,
            workers,
        }
    }

    pub fn model_id(&self) -> &str {
        self.engine.model_id()
    }

    /// Number of workers serving the queue
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Render the prompt for `query` and `context` and run it through the model.
    ///
    /// Fails with `Overloaded` if the queue stays full until `deadline`, and
    /// with `InferenceFailed` if no answer arrives before it. Engine errors
    /// are passed through unchanged.
    pub async fn infer(
        &self,
        query: &Query,
        context: &Context,
        deadline: Instant,
    ) -> Result<InferenceResult, DomainError> {
        self.infer_prompt(self.template.render(query, context), context, deadline)
            .await
    }

    /// Run an already rendered prompt through the queue. `context` only
    /// supplies the sources reported with the result.
    pub async fn infer_prompt(
        &self,
        prompt: String,
        context: &Context,
        deadline: Instant,
    ) -> Result<InferenceResult, DomainError> {
        let (reply, response) = oneshot::channel();
        let started = Instant::now();

        let job = Job {
            prompt,
            deadline,
            reply,
        };

        match timeout_at(deadline, self.sender.send(job)).await {
            Ok(Ok(())) => {}
            Ok(Err(_)) => return Err(DomainError::internal("Inference workers have stopped")),
            Err(_) => {
                return Err(DomainError::overloaded(
                    "Inference queue stayed full until the deadline",
                ))
            }
        }

        let text = match timeout_at(deadline, response).await {
            Ok(Ok(result)) => result?,
            Ok(Err(_)) => {
                return Err(DomainError::inference_failed(
                    "Inference job was dropped before completion",
                ))
            }
            Err(_) => {
                return Err(DomainError::inference_failed(
                    "Inference did not complete before the deadline",
                ))
            }
        };

        Ok(InferenceResult::new(text, self.engine.model_id(), started.elapsed())
            .with_sources(context.sources()))
    }
}

async fn worker_loop(
    worker_id: usize,
    engine: Arc<dyn InferenceEngine>,
    receiver: Arc<Mutex<mpsc::Receiver<Job>>>,
    call_timeout: Duration,
) {
    loop {
        let job = {
            let mut receiver = receiver.lock().await;
            receiver.recv().await
        };

        let Some(job) = job else {
            debug!(worker_id, "Inference queue closed, worker exiting");
            break;
        };

        run_job(worker_id, engine.as_ref(), job, call_timeout).await;
    }
}

async fn run_job(worker_id: usize, engine: &dyn InferenceEngine, job: Job, call_timeout: Duration) {
    let Job {
        prompt,
        deadline,
        mut reply,
    } = job;

    if reply.is_closed() {
        debug!(worker_id, "Caller went away, skipping queued job");
        return;
    }

    let now = Instant::now();
    if now >= deadline {
        debug!(worker_id, "Job deadline elapsed in queue, skipping");
        return;
    }

    let call_deadline = deadline.min(now + call_timeout);
    let model = engine.model_id().to_string();

    // A panicking engine fails only its own job; the worker keeps serving the queue.
    let generation = AssertUnwindSafe(engine.generate(&prompt, call_deadline)).catch_unwind();

    let result = tokio::select! {
        result = timeout_at(call_deadline, generation) => match result {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => {
                error!(worker_id, model = %model, "Model call panicked");
                Err(DomainError::inference_failed("Model call panicked"))
            }
            Err(_) => Err(DomainError::inference_failed("Model call timed out")),
        },
        _ = reply.closed() => {
            debug!(worker_id, "Caller went away, abandoning model call");
            record_inference(&model, "abandoned", now.elapsed());
            return;
        }
    };

    let outcome = match &result {
        Ok(_) => "success",
        Err(e) => {
            warn!(worker_id, model = %model, error = %e, "Model call failed");
            e.kind().as_str()
        }
    };
    record_inference(&model, outcome, now.elapsed());

    let _ = reply.send(result);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::inference::MockInferenceEngine;
    use crate::domain::{ContextFragment, QueryParams};
    use futures::future::join_all;

    fn query(text: &str) -> Query {
        Query::new(text, QueryParams::new(5, 1000, Duration::from_secs(10))).unwrap()
    }

    fn adapter(engine: Arc<MockInferenceEngine>, max_workers: usize) -> InferenceAdapter {
        InferenceAdapter::new(
            engine,
            PromptTemplate::parse("${var:query}").unwrap(),
            InferenceAdapterConfig {
                max_workers,
                queue_capacity: 16,
                call_timeout: Duration::from_secs(5),
            },
        )
    }

    fn far_deadline() -> Instant {
        Instant::now() + Duration::from_secs(60)
    }

    #[tokio::test]
    async fn test_infer_returns_result_with_sources() {
        let engine = Arc::new(MockInferenceEngine::new().with_response("Paris"));
        let adapter = adapter(engine.clone(), 2);
        let context = Context::from_fragments(
            vec![ContextFragment {
                url: "https://example.com/france".to_string(),
                title: "France".to_string(),
                text: "capital: Paris".to_string(),
                rank: 0,
            }],
            100,
        )
        .unwrap();

        let result = adapter
            .infer(&query("capital of France"), &context, far_deadline())
            .await
            .unwrap();

        assert_eq!(result.text, "Paris");
        assert_eq!(result.model, "mock-model");
        assert_eq!(result.sources, vec!["https://example.com/france"]);
        assert_eq!(engine.prompts(), vec!["capital of france"]);
    }

    /// Engine that panics on prompts containing "boom"
    #[derive(Debug)]
    struct PanickingEngine;

    #[async_trait::async_trait]
    impl InferenceEngine for PanickingEngine {
        async fn generate(&self, prompt: &str, _deadline: Instant) -> Result<String, DomainError> {
            if prompt.contains("boom") {
                panic!("engine crashed");
            }
            Ok(format!("ok: {}", prompt))
        }

        fn model_id(&self) -> &str {
            "panicking"
        }
    }

    #[tokio::test]
    async fn test_engine_panic_fails_job_and_worker_survives() {
        let adapter = InferenceAdapter::new(
            Arc::new(PanickingEngine),
            PromptTemplate::parse("${var:query}").unwrap(),
            InferenceAdapterConfig {
                max_workers: 1,
                queue_capacity: 4,
                call_timeout: Duration::from_secs(5),
            },
        );
        assert_eq!(adapter.workers(), 1);
        let context = Context::empty(100);

        let err = adapter
            .infer(&query("boom"), &context, far_deadline())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::domain::ErrorKind::InferenceFailed);

        let result = adapter
            .infer(&query("next question"), &context, far_deadline())
            .await
            .unwrap();
        assert_eq!(result.text, "ok: next question");
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_threaded_engine_is_serialized_in_fifo_order() {
        let engine = Arc::new(
            MockInferenceEngine::new()
                .with_parallelism(1)
                .with_delay(Duration::from_millis(50)),
        );
        let adapter = adapter(engine.clone(), 4);
        assert_eq!(adapter.workers(), 1);

        let queries: Vec<_> = ["one", "two", "three", "four"].into_iter().map(query).collect();
        let context = Context::empty(100);
        let deadline = far_deadline();

        let results = join_all(
            queries
                .iter()
                .map(|q| adapter.infer(q, &context, deadline)),
        )
        .await;

        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(engine.max_observed_concurrency(), 1);
        assert_eq!(engine.prompts(), vec!["one", "two", "three", "four"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_parallel_engine_uses_multiple_workers() {
        let engine = Arc::new(
            MockInferenceEngine::new()
                .with_parallelism(2)
                .with_delay(Duration::from_millis(50)),
        );
        let adapter = adapter(engine.clone(), 4);
        assert_eq!(adapter.workers(), 2);

        let queries: Vec<_> = ["a", "b", "c", "d"].into_iter().map(query).collect();
        let context = Context::empty(100);
        let deadline = far_deadline();

        let results = join_all(
            queries
                .iter()
                .map(|q| adapter.infer(q, &context, deadline)),
        )
        .await;

        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(engine.max_observed_concurrency(), 2);
    }

    #[tokio::test]
    async fn test_workers_capped_by_slot_count() {
        let engine = Arc::new(MockInferenceEngine::new().with_parallelism(8));
        assert_eq!(adapter(engine, 3).workers(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_elapsed_is_inference_failed() {
        let engine = Arc::new(MockInferenceEngine::new().with_delay(Duration::from_secs(10)));
        let adapter = adapter(engine, 1);

        let result = adapter
            .infer(
                &query("slow"),
                &Context::empty(100),
                Instant::now() + Duration::from_millis(100),
            )
            .await;

        assert!(matches!(result, Err(DomainError::InferenceFailed { .. })));
    }

    #[tokio::test]
    async fn test_resource_exhausted_passes_through() {
        let engine = Arc::new(
            MockInferenceEngine::new().with_error(DomainError::resource_exhausted("out of memory")),
        );
        let adapter = adapter(engine, 1);

        let err = adapter
            .infer(&query("big"), &Context::empty(100), far_deadline())
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::ResourceExhausted { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_job_is_skipped() {
        let engine = Arc::new(
            MockInferenceEngine::new()
                .with_parallelism(1)
                .with_delay(Duration::from_millis(100)),
        );
        let adapter = Arc::new(adapter(engine.clone(), 1));

        let first = {
            let adapter = adapter.clone();
            tokio::spawn(async move {
                adapter
                    .infer(&query("first"), &Context::empty(100), far_deadline())
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        let second = {
            let adapter = adapter.clone();
            tokio::spawn(async move {
                adapter
                    .infer(&query("second"), &Context::empty(100), far_deadline())
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        second.abort();
        let _ = second.await;

        assert!(first.await.unwrap().is_ok());
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(engine.call_count(), 1);
        assert_eq!(engine.prompts(), vec!["first"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_queue_is_overloaded() {
        let engine = Arc::new(
            MockInferenceEngine::new()
                .with_parallelism(1)
                .with_delay(Duration::from_secs(1)),
        );
        let adapter = Arc::new(InferenceAdapter::new(
            engine,
            PromptTemplate::parse("${var:query}").unwrap(),
            InferenceAdapterConfig {
                max_workers: 1,
                queue_capacity: 1,
                call_timeout: Duration::from_secs(5),
            },
        ));

        let mut running = Vec::new();
        for text in ["running", "queued"] {
            let adapter = adapter.clone();
            running.push(tokio::spawn(async move {
                adapter
                    .infer(&query(text), &Context::empty(100), far_deadline())
                    .await
            }));
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let result = adapter
            .infer(
                &query("rejected"),
                &Context::empty(100),
                Instant::now() + Duration::from_millis(50),
            )
            .await;

        assert!(matches!(result, Err(DomainError::Overloaded { .. })));

        for handle in running {
            handle.abort();
        }
    }
}

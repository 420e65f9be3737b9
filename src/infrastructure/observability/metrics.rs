//! Prometheus metrics infrastructure

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;
use regex::Regex;

use super::config::MetricsConfig;

static UUID_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}")
        .expect("valid uuid pattern")
});

static NUMERIC_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/\d+(/|$)").expect("valid numeric pattern"));

/// Prometheus metrics handle for serving metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl PrometheusMetrics {
    /// Get the metrics as a string for the /metrics endpoint
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Initialize Prometheus metrics
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    let builder = match PrometheusBuilder::new().set_buckets(&config.latency_buckets) {
        Ok(builder) => builder,
        Err(e) => {
            tracing::warn!("Invalid latency buckets, using summaries: {}", e);
            PrometheusBuilder::new()
        }
    };

    match builder.install_recorder() {
        Ok(handle) => {
            gauge!("search_inference_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);

            tracing::info!("Prometheus metrics initialized at {}", config.path);

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

/// Create the metrics router
pub fn create_metrics_router(metrics: PrometheusMetrics, path: &str) -> Router {
    Router::new()
        .route(path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

/// Record an HTTP request metric
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());

    if status >= 500 {
        counter!("http_server_errors_total", &labels).increment(1);
    }
}

/// Record the outcome of one answer request (`cached`, `answered` or an error kind)
pub fn record_answer(outcome: &str, duration: Duration) {
    let labels = [("outcome", outcome.to_string())];

    counter!("answers_total", &labels).increment(1);
    histogram!("answer_duration_seconds", &labels).record(duration.as_secs_f64());
}

/// Record the outcome of one fact check (`verified`, `refuted`, `cached`, `fallback`
/// or an error kind)
pub fn record_fact_check(outcome: &str, duration: Duration) {
    let labels = [("outcome", outcome.to_string())];

    counter!("fact_checks_total", &labels).increment(1);
    histogram!("fact_check_duration_seconds", &labels).record(duration.as_secs_f64());
}

/// Record a response cache lookup
pub fn record_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!("response_cache_lookups_total", "result" => result).increment(1);
}

/// Record a response cache failure (lookup or write)
pub fn record_cache_error(operation: &'static str) {
    counter!("response_cache_errors_total", "operation" => operation).increment(1);
}

/// Record one call to the search provider
pub fn record_retrieval_attempt(provider: &str, outcome: &str, duration: Duration) {
    let labels = [
        ("provider", provider.to_string()),
        ("outcome", outcome.to_string()),
    ];

    counter!("retrieval_attempts_total", &labels).increment(1);
    histogram!("retrieval_attempt_duration_seconds", &labels).record(duration.as_secs_f64());
}

/// Record one model invocation
pub fn record_inference(model: &str, outcome: &str, duration: Duration) {
    let labels = [
        ("model", model.to_string()),
        ("outcome", outcome.to_string()),
    ];

    counter!("inference_requests_total", &labels).increment(1);
    histogram!("inference_duration_seconds", &labels).record(duration.as_secs_f64());
}

/// Record a slot acquisition rejected for lack of capacity
pub fn record_overload(slot_class: &str) {
    counter!("slot_rejections_total", "slot_class" => slot_class.to_string()).increment(1);
}

/// Sanitize URL path for metric labels (remove IDs, limit cardinality)
fn sanitize_path(path: &str) -> String {
    let path = UUID_SEGMENT.replace_all(path, "{id}");
    let path = NUMERIC_SEGMENT.replace_all(&path, "/{id}$1");

    path.chars().take(50).collect()
}

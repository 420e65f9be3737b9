//! Observability infrastructure - Prometheus metrics

mod config;
mod metrics;

pub use config::MetricsConfig;
pub use metrics::{
    create_metrics_router, init_metrics, record_answer, record_cache_error, record_cache_lookup,
    record_fact_check, record_http_request, record_inference, record_overload,
    record_retrieval_attempt, PrometheusMetrics,
};

//! Health check endpoints for Kubernetes liveness and readiness checks

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use crate::api::types::Json;
use crate::infrastructure::concurrency::SlotUsage;

use super::state::AppState;

/// Detailed health response with component status
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<Vec<HealthCheck>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

/// Health check status
#[derive(Serialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Individual component health check
#[derive(Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Simple health check - returns 200 if the service is running
pub async fn health_check() -> impl IntoResponse {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: None,
        latency_ms: None,
    };

    (StatusCode::OK, Json(response))
}

/// Readiness check reporting model, search provider and slot pool state.
/// Saturated pools degrade the status but requests are still accepted.
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();
    let service = &state.answer_service;

    let mut checks = vec![
        HealthCheck {
            name: "model".to_string(),
            status: HealthStatus::Healthy,
            message: Some(service.model_id().to_string()),
        },
        HealthCheck {
            name: "search_provider".to_string(),
            status: HealthStatus::Healthy,
            message: Some(service.search_provider().to_string()),
        },
    ];
    checks.extend(service.slot_usage().iter().map(check_slots));

    let overall_status = if checks.iter().all(|c| c.status == HealthStatus::Healthy) {
        HealthStatus::Healthy
    } else {
        HealthStatus::Degraded
    };

    let response = HealthResponse {
        status: overall_status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: Some(checks),
        latency_ms: Some(start.elapsed().as_millis() as u64),
    };

    (StatusCode::OK, Json(response))
}

/// Liveness check - simple check to verify the service is running
pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}

fn check_slots(usage: &SlotUsage) -> HealthCheck {
    let status = if usage.available > 0 {
        HealthStatus::Healthy
    } else {
        HealthStatus::Degraded
    };

    HealthCheck {
        name: format!("{}_slots", usage.class),
        status,
        message: Some(format!(
            "{}/{} available, {} waiting",
            usage.available, usage.capacity, usage.waiting
        )),
    }
}

//! Answer endpoint handler

use axum::extract::State;
use tracing::{info, warn};

use crate::api::middleware::truncate_for_log;
use crate::api::state::AppState;
use crate::api::types::{AnswerRequest, AnswerResponse, ApiError, Json};

/// POST /v1/answer
pub async fn create_answer(
    State(state): State<AppState>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<AnswerResponse>, ApiError> {
    request.validate()?;

    info!(
        query = %truncate_for_log(&request.query, 120),
        max_results = ?request.max_results,
        context_budget = ?request.context_budget,
        timeout_ms = ?request.timeout_ms,
        "Processing answer request"
    );

    let result = state
        .answer_service
        .answer(&request.query, request.params())
        .await
        .map_err(|e| {
            warn!(error = %e, kind = %e.kind(), "Answer request failed");
            ApiError::from(e)
        })?;

    Ok(Json(AnswerResponse::from(result)))
}

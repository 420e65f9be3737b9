//! Fact-check endpoint handler

use axum::extract::State;
use tracing::{info, warn};

use crate::api::middleware::truncate_for_log;
use crate::api::state::AppState;
use crate::api::types::{ApiError, FactCheckRequest, FactCheckResponse, Json};

/// POST /v1/fact-check
pub async fn create_fact_check(
    State(state): State<AppState>,
    Json(request): Json<FactCheckRequest>,
) -> Result<Json<FactCheckResponse>, ApiError> {
    let claim = request.claim()?;

    info!(
        claim = %truncate_for_log(claim.description(), 120),
        date_claimed = ?claim.date_claimed(),
        "Processing fact-check request"
    );

    let verdict = state
        .fact_check_service
        .verify(&claim, request.params())
        .await
        .map_err(|e| {
            warn!(error = %e, kind = %e.kind(), "Fact-check request failed");
            ApiError::from(e)
        })?;

    Ok(Json(FactCheckResponse::from(verdict)))
}

//! v1 API endpoints

pub mod answer;
pub mod fact_check;

use axum::{routing::post, Router};

use super::state::AppState;

/// Create v1 API router
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/answer", post(answer::create_answer))
        .route("/fact-check", post(fact_check::create_fact_check))
}

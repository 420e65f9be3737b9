//! Infrastructure services

mod answer_service;
mod fact_check_service;

pub use answer_service::{AnswerConfig, AnswerParams, AnswerService, AnswerServiceDeps};
pub use fact_check_service::FactCheckService;

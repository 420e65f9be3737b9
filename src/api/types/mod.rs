//! HTTP API types

pub mod answer;
pub mod error;
pub mod fact_check;
pub mod json;

pub use answer::{AnswerRequest, AnswerResponse};
pub use error::{ApiError, ApiErrorResponse, ApiErrorType};
pub use fact_check::{FactCheckRequest, FactCheckResponse};
pub use json::Json;

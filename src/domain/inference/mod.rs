//! Inference domain - model engine capability, prompts and results

mod engine;
mod prompt;
mod result;

pub use engine::InferenceEngine;
pub use prompt::{PromptTemplate, DEFAULT_PROMPT_TEMPLATE, EMPTY_CONTEXT_PLACEHOLDER};
pub use result::InferenceResult;

#[cfg(test)]
pub use engine::mock::MockInferenceEngine;

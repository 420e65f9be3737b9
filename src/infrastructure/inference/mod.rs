//! Inference infrastructure - model engines and the queueing adapter

mod adapter;
mod echo;
mod factory;
mod openai_compatible;

pub use adapter::{InferenceAdapter, InferenceAdapterConfig};
pub use echo::EchoEngine;
pub use factory::{InferenceEngineConfig, InferenceEngineFactory, InferenceEngineKind};
pub use openai_compatible::OpenAiCompatibleEngine;

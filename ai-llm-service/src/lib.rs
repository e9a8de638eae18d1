//! Shared LLM access for the legal RAG backend.
//!
//! - [`service_profiles::LlmServiceProfiles`]: cached clients for the rewrite and embedding profiles
//! - [`config`]: provider/model configs built from the environment
//! - [`error_handler`]: unified [`error_handler::AiLlmError`]
//! - [`telemetry`]: workspace-scoped tracing layer

pub mod chat;
pub mod config;
pub mod error_handler;
pub mod service_profiles;
pub mod services;
pub mod telemetry;

pub use chat::{ChatMessage, ChatOptions, ChatRole};
pub use config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
pub use error_handler::AiLlmError;
pub use service_profiles::LlmServiceProfiles;

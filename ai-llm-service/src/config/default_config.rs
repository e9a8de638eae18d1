//! Default LLM configs loaded strictly from environment variables.
//!
//! Two roles are used by the legal RAG backend:
//!
//! - **Embedding** → turns retrieval queries and knowledge documents into vectors
//! - **Rewrite**   → chat model for summary refinement and section assessment
//!
//! # Environment variables
//!
//! Common:
//! - `LLM_KIND` = provider kind (`openai` or `ollama`, default `openai`)
//! - `LLM_MAX_TOKENS` = optional max tokens (u32, default 2000)
//! - `EMBEDDING_MODEL` = embedding model (mandatory)
//! - `REWRITE_MODEL` = chat model (mandatory for the rewrite profile)
//! - `EMBEDDING_TIMEOUT_SECS` (default 10), `REWRITE_TIMEOUT_SECS` (default 30)
//!
//! OpenAI-specific:
//! - `OPENAI_URL` (mandatory), `OPENAI_API_KEY` (mandatory)
//!
//! Ollama-specific:
//! - `OLLAMA_URL` or `OLLAMA_PORT` = endpoint (mandatory)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, ConfigError, env_opt_u32, env_opt_u64, must_env, opt_env,
        validate_http_endpoint,
    },
};

/// Default embedding request timeout.
pub const DEFAULT_EMBEDDING_TIMEOUT_SECS: u64 = 10;
/// Default chat (rewrite) request timeout.
pub const DEFAULT_REWRITE_TIMEOUT_SECS: u64 = 30;
/// Default generation budget for the rewrite profile.
pub const DEFAULT_REWRITE_MAX_TOKENS: u32 = 2000;
/// Low temperature keeps rewrites close to the source wording.
pub const DEFAULT_REWRITE_TEMPERATURE: f32 = 0.3;

/// Reads `LLM_KIND`, defaulting to the OpenAI-compatible dialect.
fn provider_from_env() -> Result<LlmProvider, AiLlmError> {
    match opt_env("LLM_KIND") {
        Some(kind) => Ok(kind.parse::<LlmProvider>()?),
        None => Ok(LlmProvider::OpenAI),
    }
}

/// Resolves the Ollama endpoint strictly from environment.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
fn ollama_endpoint() -> Result<String, AiLlmError> {
    if let Some(url) = opt_env("OLLAMA_URL") {
        validate_http_endpoint("OLLAMA_URL", &url)?;
        return Ok(url);
    }
    if let Some(port) = opt_env("OLLAMA_PORT") {
        port.trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidNumber {
                var: "OLLAMA_PORT",
                reason: "expected u16 (1..=65535)",
            })?;
        return Ok(format!("http://localhost:{}", port.trim()));
    }
    Err(ConfigError::MissingVar("OLLAMA_URL or OLLAMA_PORT").into())
}

/// Endpoint and credentials for the selected provider.
fn endpoint_for(provider: LlmProvider) -> Result<(String, Option<String>), AiLlmError> {
    match provider {
        LlmProvider::Ollama => Ok((ollama_endpoint()?, None)),
        LlmProvider::OpenAI => {
            let url = must_env("OPENAI_URL")?;
            validate_http_endpoint("OPENAI_URL", &url)?;
            let key = must_env("OPENAI_API_KEY")?;
            Ok((url, Some(key)))
        }
    }
}

/// Constructs the **embedding** profile.
///
/// # Env
/// - `EMBEDDING_MODEL` (required)
/// - `EMBEDDING_TIMEOUT_SECS` (optional, default 10)
pub fn config_embedding() -> Result<LlmModelConfig, AiLlmError> {
    let provider = provider_from_env()?;
    let (endpoint, api_key) = endpoint_for(provider)?;
    let model = must_env("EMBEDDING_MODEL")?;
    let timeout = env_opt_u64("EMBEDDING_TIMEOUT_SECS")?.unwrap_or(DEFAULT_EMBEDDING_TIMEOUT_SECS);

    let cfg = LlmModelConfig {
        provider,
        model,
        endpoint,
        api_key,
        max_tokens: None,
        temperature: None,
        top_p: None,
        timeout_secs: Some(timeout),
    };
    cfg.validate()?;
    Ok(cfg)
}

/// Constructs the **rewrite** (chat) profile.
///
/// # Env
/// - `REWRITE_MODEL` (required)
/// - `LLM_MAX_TOKENS` (optional, default 2000)
/// - `REWRITE_TIMEOUT_SECS` (optional, default 30)
pub fn config_rewrite() -> Result<LlmModelConfig, AiLlmError> {
    let provider = provider_from_env()?;
    let (endpoint, api_key) = endpoint_for(provider)?;
    let model = must_env("REWRITE_MODEL")?;
    let max_tokens = env_opt_u32("LLM_MAX_TOKENS")?.unwrap_or(DEFAULT_REWRITE_MAX_TOKENS);
    let timeout = env_opt_u64("REWRITE_TIMEOUT_SECS")?.unwrap_or(DEFAULT_REWRITE_TIMEOUT_SECS);

    let cfg = LlmModelConfig {
        provider,
        model,
        endpoint,
        api_key,
        max_tokens: Some(max_tokens),
        temperature: Some(DEFAULT_REWRITE_TEMPERATURE),
        top_p: None,
        timeout_secs: Some(timeout),
    };
    cfg.validate()?;
    Ok(cfg)
}

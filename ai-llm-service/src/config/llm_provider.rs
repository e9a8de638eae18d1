use std::str::FromStr;

use crate::error_handler::ConfigError;

/// Represents the provider (backend) used for embedding and chat inference.
///
/// `OpenAI` covers every endpoint speaking the OpenAI REST dialect
/// (`/v1/chat/completions`, `/v1/embeddings`), including self-hosted gateways.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// Local Ollama runtime.
    Ollama,
    /// OpenAI-compatible REST API.
    OpenAI,
}

impl FromStr for LlmProvider {
    type Err = ConfigError;

    /// Parses the `LLM_KIND` value (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(LlmProvider::Ollama),
            "openai" | "chatgpt" => Ok(LlmProvider::OpenAI),
            other => Err(ConfigError::UnsupportedProvider(other.to_string())),
        }
    }
}

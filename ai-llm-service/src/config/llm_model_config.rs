use crate::{
    config::llm_provider::LlmProvider,
    error_handler::{ConfigError, Result, validate_http_endpoint, validate_range_f32},
};

/// Configuration for an LLM model invocation.
///
/// # Fields
///
/// - `provider`: Which backend to use (Ollama, OpenAI-compatible).
/// - `model`: The model identifier (e.g., `"m3e-base"`, `"qwen2.5:7b"`).
/// - `endpoint`: Base URL of the inference server.
/// - `api_key`: Optional API key for providers that require authentication.
/// - `max_tokens`: Maximum number of tokens to generate (chat only).
/// - `temperature`: Sampling temperature (chat only).
/// - `top_p`: Nucleus sampling cutoff.
/// - `timeout_secs`: Request timeout in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmModelConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub timeout_secs: Option<u64>,
}

impl LlmModelConfig {
    /// Checks the fields a client cannot work without.
    ///
    /// # Errors
    /// [`ConfigError::EmptyModel`], [`ConfigError::InvalidFormat`] for the endpoint,
    /// [`ConfigError::OutOfRange`] for sampling parameters.
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel.into());
        }
        validate_http_endpoint("endpoint", self.endpoint.trim())?;
        if let Some(t) = self.temperature {
            validate_range_f32("temperature", t, 0.0, 2.0)?;
        }
        if let Some(p) = self.top_p {
            validate_range_f32("top_p", p, 0.0, 1.0)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::OpenAI,
            model: "m3e-base".into(),
            endpoint: "http://localhost:8080".into(),
            api_key: Some("k".into()),
            max_tokens: None,
            temperature: Some(0.3),
            top_p: None,
            timeout_secs: Some(10),
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(cfg().validate().is_ok());
    }

    #[test]
    fn empty_model_is_rejected() {
        let mut c = cfg();
        c.model = "  ".into();
        assert!(c.validate().is_err());
    }

    #[test]
    fn provider_parses_case_insensitive() {
        assert_eq!("OpenAI".parse::<LlmProvider>().ok(), Some(LlmProvider::OpenAI));
        assert_eq!("ollama".parse::<LlmProvider>().ok(), Some(LlmProvider::Ollama));
        assert!("vertex".parse::<LlmProvider>().is_err());
    }
}

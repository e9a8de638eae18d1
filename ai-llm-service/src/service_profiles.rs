//! Shared LLM service with two active profiles: `rewrite` and `embedding`.
//!
//! - Lives in the same Tokio runtime as the application.
//! - Construct once, wrap in `Arc`, and pass clones to dependents.
//! - Caches underlying HTTP clients per config (endpoint+model+key+timeout).
//! - Every call is bounded by the profile timeout on top of the HTTP client timeout.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::service_profiles::LlmServiceProfiles;
//! use ai_llm_service::config::default_config::{config_embedding, config_rewrite};
//!
//! # async fn run() -> Result<(), ai_llm_service::error_handler::AiLlmError> {
//! let svc = Arc::new(LlmServiceProfiles::new(config_rewrite()?, config_embedding()?));
//! let vectors = svc.embed_batch(&["个人信息保护".to_string()]).await?;
//! println!("dim = {}", vectors[0].len());
//! # Ok(()) }
//! ```

use std::{collections::HashMap, future::Future, sync::Arc, time::Duration};

use tokio::sync::RwLock;
use tracing::warn;

use crate::{
    chat::{ChatMessage, ChatOptions},
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::AiLlmError,
    services::{ollama_service::OllamaService, open_ai_service::OpenAiService},
};

/// Shared service that manages the **rewrite** (chat) and **embedding** profiles.
pub struct LlmServiceProfiles {
    rewrite: LlmModelConfig,
    embedding: LlmModelConfig,

    ollama: RwLock<HashMap<ClientKey, Arc<OllamaService>>>,
    openai: RwLock<HashMap<ClientKey, Arc<OpenAiService>>>,
}

impl LlmServiceProfiles {
    pub fn new(rewrite: LlmModelConfig, embedding: LlmModelConfig) -> Self {
        Self {
            rewrite,
            embedding,
            ollama: RwLock::new(HashMap::new()),
            openai: RwLock::new(HashMap::new()),
        }
    }

    /// Runs a chat completion on the **rewrite** profile.
    ///
    /// # Errors
    /// Transport, provider and [`AiLlmError::Timeout`] errors.
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        opts: ChatOptions,
    ) -> Result<String, AiLlmError> {
        let cfg = &self.rewrite;
        with_timeout(cfg, async {
            match cfg.provider {
                LlmProvider::Ollama => self.get_or_init_ollama(cfg).await?.chat(messages, opts).await,
                LlmProvider::OpenAI => self.get_or_init_openai(cfg).await?.chat(messages, opts).await,
            }
        })
        .await
    }

    /// Embeds a batch of texts on the **embedding** profile.
    ///
    /// The result has exactly one vector per input, in input order.
    pub async fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, AiLlmError> {
        let cfg = &self.embedding;
        with_timeout(cfg, async {
            match cfg.provider {
                LlmProvider::Ollama => self.get_or_init_ollama(cfg).await?.embeddings(inputs).await,
                LlmProvider::OpenAI => self.get_or_init_openai(cfg).await?.embeddings(inputs).await,
            }
        })
        .await
    }

    /// Returns references to the current profiles `(rewrite, embedding)`.
    pub fn profiles(&self) -> (&LlmModelConfig, &LlmModelConfig) {
        (&self.rewrite, &self.embedding)
    }

    /* --------------------- Internals --------------------- */

    async fn get_or_init_ollama(
        &self,
        cfg: &LlmModelConfig,
    ) -> Result<Arc<OllamaService>, AiLlmError> {
        let key = ClientKey::from(cfg);
        if let Some(cli) = self.ollama.read().await.get(&key).cloned() {
            return Ok(cli);
        }
        let mut w = self.ollama.write().await;
        if let Some(cli) = w.get(&key) {
            return Ok(cli.clone());
        }
        let cli = Arc::new(OllamaService::new(cfg.clone())?);
        w.insert(key, cli.clone());
        Ok(cli)
    }

    async fn get_or_init_openai(
        &self,
        cfg: &LlmModelConfig,
    ) -> Result<Arc<OpenAiService>, AiLlmError> {
        let key = ClientKey::from(cfg);
        if let Some(cli) = self.openai.read().await.get(&key).cloned() {
            return Ok(cli);
        }
        let mut w = self.openai.write().await;
        if let Some(cli) = w.get(&key) {
            return Ok(cli.clone());
        }
        let cli = Arc::new(OpenAiService::new(cfg.clone())?);
        w.insert(key, cli.clone());
        Ok(cli)
    }
}

async fn with_timeout<T, F>(cfg: &LlmModelConfig, fut: F) -> Result<T, AiLlmError>
where
    F: Future<Output = Result<T, AiLlmError>>,
{
    let limit = Duration::from_secs(cfg.timeout_secs.unwrap_or(60));
    match tokio::time::timeout(limit, fut).await {
        Ok(res) => res,
        Err(_) => {
            warn!(model = %cfg.model, timeout_secs = limit.as_secs(), "LLM call timed out");
            Err(AiLlmError::Timeout(limit))
        }
    }
}

/// Internal cache key to identify unique client configs.
#[derive(Clone, PartialEq, Eq, Hash)]
struct ClientKey {
    provider: LlmProvider,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    timeout: Option<u64>,
}

impl From<&LlmModelConfig> for ClientKey {
    fn from(cfg: &LlmModelConfig) -> Self {
        Self {
            provider: cfg.provider,
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            api_key: cfg.api_key.clone(),
            timeout: cfg.timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn cfg(endpoint: String, timeout: u64) -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::OpenAI,
            model: "m".into(),
            endpoint,
            api_key: Some("k".into()),
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_secs: Some(timeout),
        }
    }

    #[tokio::test]
    async fn slow_upstream_maps_to_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(3))
                    .set_body_json(json!({"data": [{"index": 0, "embedding": [1.0]}]})),
            )
            .mount(&server)
            .await;

        let c = cfg(server.uri(), 1);
        let svc = LlmServiceProfiles::new(c.clone(), c);
        let err = svc.embed_batch(&["x".to_string()]).await.unwrap_err();
        assert!(matches!(
            err,
            AiLlmError::Timeout(_) | AiLlmError::HttpTransport(_)
        ));
    }

    #[tokio::test]
    async fn clients_are_cached_per_config() {
        let c = cfg("http://localhost:9".into(), 5);
        let svc = LlmServiceProfiles::new(c.clone(), c.clone());
        let a = svc.get_or_init_openai(&c).await.unwrap();
        let b = svc.get_or_init_openai(&c).await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}

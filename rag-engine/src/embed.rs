//! Embedding capability consumed by the pipeline.

use std::future::Future;
use std::pin::Pin;

use ai_llm_service::AiLlmError;
use ai_llm_service::service_profiles::LlmServiceProfiles;

/// Boxed future returned by the capability traits of this crate.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Maps texts to fixed-length vectors, one per input, in input order.
///
/// Any error (non-2xx, malformed body, missing data) is fatal for the
/// query that asked for it.
pub trait EmbeddingsProvider: Send + Sync {
    fn embed<'a>(&'a self, texts: &'a [String]) -> BoxFuture<'a, Result<Vec<Vec<f32>>, AiLlmError>>;
}

impl EmbeddingsProvider for LlmServiceProfiles {
    fn embed<'a>(&'a self, texts: &'a [String]) -> BoxFuture<'a, Result<Vec<Vec<f32>>, AiLlmError>> {
        Box::pin(self.embed_batch(texts))
    }
}

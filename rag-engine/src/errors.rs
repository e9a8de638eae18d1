//! Unified error type for the rag-engine crate.

use std::path::PathBuf;
use std::time::Duration;

use ai_llm_service::AiLlmError;
use rag_store::StoreError;
use thiserror::Error;

/// Errors produced by query processing and knowledge ingestion.
#[derive(Debug, Error)]
pub enum RagEngineError {
    // ── Configuration / environment ──────────────────────────────────────────
    /// Failed to parse an environment variable into the expected type.
    #[error("[RAG Engine] failed to parse env variable: {key} = '{value}'")]
    EnvParse { key: String, value: String },

    /// Configuration combination is invalid.
    #[error("[RAG Engine] invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Embeddings backend ──────────────────────────────────────────────────
    /// The embedding provider failed; the query cannot be answered.
    #[error("[RAG Engine] embedding provider failed: {0}")]
    Embedding(#[source] AiLlmError),

    /// The embedding call exceeded the pipeline deadline.
    #[error("[RAG Engine] embedding provider timed out after {0:?}")]
    EmbeddingTimeout(Duration),

    /// Provider answered with the wrong number of vectors or an empty vector.
    #[error("[RAG Engine] embedding provider returned {got} usable vectors for {expected} inputs")]
    EmbeddingShape { expected: usize, got: usize },

    // ── Store / filesystem ──────────────────────────────────────────────────
    /// Persisting ingested documents failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Knowledge directory could not be listed.
    #[error("[RAG Engine] cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, RagEngineError>;

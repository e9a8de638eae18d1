//! Unified error types for the crate.

use thiserror::Error;

/// Top-level error for rag-store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O or filesystem errors.
    #[error("[Rag Store] io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors while persisting rows.
    #[error("[Rag Store] serialize error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Invalid or unsupported configuration.
    #[error("[Rag Store] config error: {0}")]
    Config(String),

    /// `add` received parallel inputs of different lengths.
    #[error(
        "[Rag Store] length mismatch: documents={documents}, embeddings={embeddings}, metadata={metadata}"
    )]
    LengthMismatch {
        documents: usize,
        embeddings: usize,
        metadata: usize,
    },

    /// Embedding dimensionality differs from the collection.
    #[error("[Rag Store] vector size mismatch: got {got}, want {want}")]
    VectorSizeMismatch { got: usize, want: usize },

    /// The in-memory index lock was poisoned by a panicking writer.
    #[error("[Rag Store] collection `{0}` lock poisoned")]
    Poisoned(String),
}

//! Vector store for the legal RAG backend.
//!
//! This crate provides:
//! - [`VectorStore`]: the collection contract used by the retrieval pipeline
//! - [`LocalVectorStore`]: exact cosine search over an append-only JSONL file
//! - [`StoreConfig`]: where collections live and which ones are opened
//!
//! Retrieval never fails the caller: an empty collection or an internal
//! search error yields an empty result and an `error!`/`info!` log line.

mod config;
mod distance;
mod errors;
mod io_jsonl;
mod local_store;
mod record;

pub use config::{DEFAULT_COLLECTION, DEFAULT_STORE_DIR, StoreConfig};
pub use distance::cosine_distance;
pub use errors::StoreError;
pub use local_store::LocalVectorStore;
pub use record::{Document, DocumentMetadata, QueryColumns, RetrievedDocument, split_keywords};

/// A named collection of `(document, embedding, metadata)` triples.
///
/// Concurrent queries are safe. Implementations serialize `add` internally so
/// id assignment (`doc_<next free id + i>`) stays consistent.
pub trait VectorStore: Send + Sync {
    /// Collection name (for logs).
    fn name(&self) -> &str;

    /// Stores the documents durably and returns their assigned ids.
    ///
    /// An empty `documents` slice is a logged no-op.
    ///
    /// # Errors
    /// [`StoreError::LengthMismatch`] when the three inputs differ in length,
    /// [`StoreError::VectorSizeMismatch`] on a dimension change, I/O errors
    /// while persisting. Nothing is published to readers on error.
    fn add(
        &self,
        documents: &[String],
        embeddings: &[Vec<f32>],
        metadata: &[DocumentMetadata],
    ) -> Result<Vec<String>, StoreError>;

    /// Returns up to `top_k` rows ordered by ascending cosine distance.
    fn query(&self, embedding: &[f32], top_k: usize) -> Vec<RetrievedDocument>;

    /// Number of stored documents.
    fn count(&self) -> usize;
}

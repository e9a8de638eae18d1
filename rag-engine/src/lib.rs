//! Retrieval pipeline for the legal RAG backend.
//!
//! Public API:
//! - [`RagEngine::process_query`]: keywords, scored summary, embedding, top-k retrieval, context.
//! - [`RagEngine::ingest_document`] / [`RagEngine::ingest_directory`]: build the knowledge collection.
//! - [`text::TextAnalyzer`]: pluggable tokenizer / keyword extractor ([`DefaultTextAnalyzer`]).
//! - [`EmbeddingsProvider`] and [`TextRewriter`]: the two network capabilities.
//! - [`ErrorTally`]: counts recovered failures of optional steps.

pub mod config;
pub mod embed;
pub mod errors;
pub mod pipeline;
pub mod rewrite;
pub mod summary;
pub mod tally;
pub mod text;

pub use config::{DEFAULT_QUERY_PREFIX, RagEngineConfig};
pub use embed::{BoxFuture, EmbeddingsProvider};
pub use errors::RagEngineError;
pub use pipeline::{IngestStats, MISSING_CONTENT, NO_KEYWORDS, QueryResult, RagEngine, build_context};
pub use rewrite::TextRewriter;
pub use summary::ScoredSummarizer;
pub use tally::ErrorTally;
pub use text::{DefaultTextAnalyzer, TextAnalyzer};

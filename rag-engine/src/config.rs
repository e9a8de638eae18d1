//! Pipeline knobs read from the environment.

use std::str::FromStr;
use std::time::Duration;

use crate::errors::{RagEngineError, Result};

/// Instruction prefix turning a document into a retrieval query.
pub const DEFAULT_QUERY_PREFIX: &str = "为这个句子生成表示以用于检索相关文章：";

/// Runtime configuration of [`crate::RagEngine`].
#[derive(Debug, Clone, PartialEq)]
pub struct RagEngineConfig {
    /// Ranked keywords returned per query.
    pub keyword_top_k: usize,
    /// Sentences in the extractive summary.
    pub summary_sentences: usize,
    /// Documents retrieved from the vector store.
    pub retrieval_top_k: usize,
    /// Prefix prepended to the text before embedding.
    pub query_prefix: String,
    /// Deadline for one embedding call.
    pub embed_timeout: Duration,
    /// Run the optional LLM refinement over the summary.
    pub refine_summary: bool,
    /// Deadline for one refinement call.
    pub refine_timeout: Duration,
}

impl Default for RagEngineConfig {
    fn default() -> Self {
        Self {
            keyword_top_k: 5,
            summary_sentences: 3,
            retrieval_top_k: 3,
            query_prefix: DEFAULT_QUERY_PREFIX.to_string(),
            embed_timeout: Duration::from_secs(10),
            refine_summary: false,
            refine_timeout: Duration::from_secs(30),
        }
    }
}

impl RagEngineConfig {
    /// Build configuration from environment variables.
    ///
    /// Environment variables used (all optional):
    /// - `RAG_KEYWORD_TOP_K` (default: 5)
    /// - `RAG_SUMMARY_SENTENCES` (default: 3)
    /// - `RAG_TOP_K` (default: 3)
    /// - `RAG_QUERY_PREFIX` (default: the Chinese retrieval instruction)
    /// - `EMBEDDING_TIMEOUT_SECS` (default: 10)
    /// - `RAG_REFINE_SUMMARY` (default: false)
    /// - `REWRITE_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self> {
        let d = Self::default();
        let cfg = Self {
            keyword_top_k: read_env("RAG_KEYWORD_TOP_K", d.keyword_top_k)?,
            summary_sentences: read_env("RAG_SUMMARY_SENTENCES", d.summary_sentences)?,
            retrieval_top_k: read_env("RAG_TOP_K", d.retrieval_top_k)?,
            query_prefix: std::env::var("RAG_QUERY_PREFIX").unwrap_or(d.query_prefix),
            embed_timeout: Duration::from_secs(read_env(
                "EMBEDDING_TIMEOUT_SECS",
                d.embed_timeout.as_secs(),
            )?),
            refine_summary: read_env("RAG_REFINE_SUMMARY", d.refine_summary)?,
            refine_timeout: Duration::from_secs(read_env(
                "REWRITE_TIMEOUT_SECS",
                d.refine_timeout.as_secs(),
            )?),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Rejects zero-sized knobs.
    pub fn validate(&self) -> Result<()> {
        if self.keyword_top_k == 0 {
            return Err(RagEngineError::InvalidConfig(
                "RAG_KEYWORD_TOP_K must be > 0".into(),
            ));
        }
        if self.retrieval_top_k == 0 {
            return Err(RagEngineError::InvalidConfig("RAG_TOP_K must be > 0".into()));
        }
        if self.embed_timeout.is_zero() {
            return Err(RagEngineError::InvalidConfig(
                "EMBEDDING_TIMEOUT_SECS must be > 0".into(),
            ));
        }
        Ok(())
    }
}

/// Reads `key` as `T`; unset or blank keeps `default`, garbage is an error.
fn read_env<T: FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => {
            v.trim().parse::<T>().map_err(|_| RagEngineError::EnvParse {
                key: key.into(),
                value: v,
            })
        }
        _ => Ok(default),
    }
}

//! Unified error type for the legal-analyzer crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading analyzer configuration or running an
/// analysis step.
///
/// Step errors never reach the HTTP caller: the analyzer records them in the
/// error tally and reports the step as `null`.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    // ── Configuration / environment ──────────────────────────────────────────
    /// Failed to parse an environment variable into the expected type.
    #[error("[Legal Analyzer] failed to parse env variable: {key} = '{value}'")]
    EnvParse { key: String, value: String },

    /// Configuration combination is invalid.
    #[error("[Legal Analyzer] invalid configuration: {0}")]
    InvalidConfig(String),

    // ── I/O & JSON ──────────────────────────────────────────────────────────
    /// Config file could not be read.
    #[error("[Legal Analyzer] cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for the expected shape.
    #[error("[Legal Analyzer] invalid config json in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    // ── Analysis steps ──────────────────────────────────────────────────────
    /// The input has no material for this step (no sentences, no words...).
    #[error("[Legal Analyzer] {step}: {reason}")]
    Degenerate { step: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;

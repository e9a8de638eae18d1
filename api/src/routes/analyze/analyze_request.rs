use serde::Deserialize;

/// Request payload for `POST /analyze`.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// Document text to analyze.
    pub text: String,
    /// `privacy` (default), `contract`, `intellectual_property`, or any
    /// template key from the legal config.
    #[serde(default)]
    pub domain: Option<String>,
    /// Retrieve from the professional collection when configured.
    #[serde(default)]
    pub use_professional_kb: bool,
}

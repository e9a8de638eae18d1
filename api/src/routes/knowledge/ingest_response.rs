use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub message: String,
    pub indexed: usize,
    pub skipped: usize,
    pub duration_ms: u128,
    /// Documents in the default collection after ingestion.
    pub total_documents: usize,
}

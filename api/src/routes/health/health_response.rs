use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub documents: usize,
    /// `None` when no professional collection is configured.
    pub professional_documents: Option<usize>,
    pub error_statistics: BTreeMap<String, u64>,
}

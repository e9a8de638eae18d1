//! POST /knowledge/ingest: (re)ingests `KNOWLEDGE_BASE_DIR` into the
//! default collection.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Response,
};
use tracing::{debug, info};

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::{AppError, AppResult},
    routes::knowledge::ingest_response::IngestResponse,
};

pub async fn ingest_route(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Response> {
    if let Some(id) = headers.get("X-Request-Id").and_then(|h| h.to_str().ok()) {
        debug!(%id, "request id attached");
    }

    let dir = state.knowledge_dir.as_ref().ok_or(AppError::Http {
        status: StatusCode::SERVICE_UNAVAILABLE,
        code: "KNOWLEDGE_DIR_UNSET",
        message: "KNOWLEDGE_BASE_DIR is not configured".into(),
    })?;

    let rag = state.analysis.rag();
    let stats = rag.ingest_directory(dir).await?;
    let total_documents = rag.default_store().count();
    info!(
        indexed = stats.indexed,
        skipped = stats.skipped,
        total_documents,
        "ingest_route: finished"
    );

    Ok(ApiResponse::success(IngestResponse {
        message: format!("Ingested {} documents from {}", stats.indexed, dir.display()),
        indexed: stats.indexed,
        skipped: stats.skipped,
        duration_ms: stats.duration_ms,
        total_documents,
    })
    .into_response_with_status(StatusCode::OK))
}

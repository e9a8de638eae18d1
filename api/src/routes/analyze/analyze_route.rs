//! POST /analyze: integrated RAG + legal analysis of one document.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Response,
};
use tracing::{debug, error};

use crate::{
    analysis::DEFAULT_DOMAIN,
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::{AppError, AppResult},
    routes::analyze::analyze_request::AnalyzeRequest,
};

/// Handler: POST /analyze
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:5000/analyze \
///   -H 'content-type: application/json' \
///   -d '{"text":"本隐私政策说明我们如何收集个人信息。","domain":"privacy"}'
/// ```
pub async fn analyze_route(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<AnalyzeRequest>,
) -> AppResult<Response> {
    let request_id = headers
        .get("X-Request-Id")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("-");

    if body.text.trim().is_empty() {
        return Err(AppError::BadRequest("text must not be empty".into()));
    }
    let domain = body
        .domain
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or(DEFAULT_DOMAIN);

    debug!(request_id = %request_id, domain, "analyze_route: start");

    let report = state
        .analysis
        .analyze_document(&body.text, domain, body.use_professional_kb)
        .await
        .inspect_err(|e| error!(request_id = %request_id, error = %e, "analyze_route: failed"))?;

    debug!(
        request_id = %request_id,
        retrieved = report.rag_analysis.retrieved,
        "analyze_route: success"
    );
    Ok(ApiResponse::success(report).into_response_with_status(StatusCode::OK))
}

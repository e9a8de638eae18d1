//! GET /health: liveness plus collection sizes.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Response};

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    routes::health::health_response::HealthResponse,
};

pub async fn health_route(State(state): State<Arc<AppState>>) -> Response {
    let rag = state.analysis.rag();
    ApiResponse::success(HealthResponse {
        status: "ok",
        documents: rag.default_store().count(),
        professional_documents: rag.professional_store().map(|s| s.count()),
        error_statistics: state.analysis.tally().snapshot(),
    })
    .into_response_with_status(StatusCode::OK)
}

//! HTTP front end of the legal RAG backend.
//!
//! Routes:
//! - `POST /analyze`: integrated RAG + legal analysis ([`analysis::IntegratedAnalysis`])
//! - `POST /knowledge/ingest`: ingest `KNOWLEDGE_BASE_DIR` into the default collection
//! - `GET /health`: liveness, collection sizes, recovered-failure counts

pub mod analysis;
pub mod core;
pub mod error_handler;
mod middleware_layer;
mod routes;

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tokio::signal;
use tracing::{info, warn};

use crate::core::app_state::AppState;
use crate::error_handler::AppError;
use crate::middleware_layer::json_extractor::json_error_mapper;
use crate::routes::{
    analyze::analyze_route::analyze_route, health::health_route::health_route,
    knowledge::ingest_route::ingest_route,
};

/// Builds the router over an already wired state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/analyze", post(analyze_route))
        .route("/knowledge/ingest", post(ingest_route))
        .route("/health", get(health_route))
        .layer(middleware::from_fn(json_error_mapper))
        .with_state(state)
}

/// Wires state from the environment and serves until Ctrl+C.
pub async fn start() -> Result<(), AppError> {
    let host_url = std::env::var("API_ADDRESS")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(AppError::MissingEnv("API_ADDRESS"))?;

    let state = Arc::new(AppState::from_env()?);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&host_url)
        .await
        .map_err(AppError::Bind)?;
    info!(address = %host_url, "api listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("api stopped");
    Ok(())
}

/// Resolves when Ctrl+C is pressed.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal; shutting down");
    }
}

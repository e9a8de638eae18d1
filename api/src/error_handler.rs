use ai_llm_service::AiLlmError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use legal_analyzer::AnalyzerError;
use rag_engine::RagEngineError;
use rag_store::StoreError;
use thiserror::Error;

use crate::core::http::response_envelope::ApiResponse;

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error("missing required environment variable: {0}")]
    MissingEnv(&'static str),

    #[error(transparent)]
    Llm(#[from] AiLlmError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Analyzer(#[from] AnalyzerError),

    // --- IO / network / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request / pipeline ---
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Rag(#[from] RagEngineError),

    /// Rich HTTP error with a specific status & code.
    #[error("{message}")]
    Http {
        status: StatusCode,
        code: &'static str,
        message: String,
    },
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Http { status, .. } => *status,
            AppError::Rag(e) => rag_status(e),

            // startup-only
            AppError::MissingEnv(_)
            | AppError::Llm(_)
            | AppError::Store(_)
            | AppError::Analyzer(_)
            | AppError::Bind(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::MissingEnv(_) => "MISSING_ENV",
            AppError::Llm(_) | AppError::Store(_) | AppError::Analyzer(_) => "CONFIG_ERROR",
            AppError::Bind(_) => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Rag(RagEngineError::Embedding(_))
            | AppError::Rag(RagEngineError::EmbeddingShape { .. }) => "EMBEDDING_FAILED",
            AppError::Rag(RagEngineError::EmbeddingTimeout(_)) => "EMBEDDING_TIMEOUT",
            AppError::Rag(RagEngineError::Io { .. }) => "KNOWLEDGE_DIR_UNREADABLE",
            AppError::Rag(_) => "RAG_FAILED",
            AppError::Http { code, .. } => code,
        }
    }
}

/// Upstream failures are gateway errors; local ones are internal.
fn rag_status(e: &RagEngineError) -> StatusCode {
    match e {
        RagEngineError::Embedding(_) | RagEngineError::EmbeddingShape { .. } => {
            StatusCode::BAD_GATEWAY
        }
        RagEngineError::EmbeddingTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        ApiResponse::<()>::error(self.error_code(), self.to_string(), Vec::new())
            .into_response_with_status(status)
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(err: axum::extract::rejection::JsonRejection) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

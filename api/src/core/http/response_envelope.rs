use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

/// JSON envelope of every endpoint: `data` on success, `error` on failure.
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    /// RFC3339 UTC, millisecond precision.
    pub timestamp: String,
}

#[derive(Serialize)]
pub struct ApiError {
    /// Stable code such as `EMBEDDING_FAILED` or `BAD_REQUEST`.
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ApiErrorDetail>,
}

/// Points a client at the offending request field.
#[derive(Serialize)]
pub struct ApiErrorDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self::build(Some(data), None)
    }

    pub fn error(
        code: &'static str,
        message: impl Into<String>,
        details: Vec<ApiErrorDetail>,
    ) -> Self {
        let error = ApiError {
            code,
            message: message.into(),
            details,
        };
        Self::build(None, Some(error))
    }

    pub fn into_response_with_status(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }

    fn build(data: Option<T>, error: Option<ApiError>) -> Self {
        Self {
            success: error.is_none(),
            data,
            error,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_envelope_has_no_data() {
        let v = serde_json::to_value(ApiResponse::<()>::error("BAD_REQUEST", "nope", vec![])).unwrap();
        assert_eq!(v["success"], false);
        assert!(v.get("data").is_none());
        assert_eq!(v["error"]["code"], "BAD_REQUEST");
        assert!(v["error"].get("details").is_none());
        assert!(v["timestamp"].as_str().unwrap().ends_with('Z'));
    }
}

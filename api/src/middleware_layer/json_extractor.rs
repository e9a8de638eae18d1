use axum::{
    body::{Body, Bytes},
    http::{HeaderValue, Request, StatusCode, header},
    middleware::Next,
    response::Response,
};

use crate::core::http::response_envelope::{ApiErrorDetail, ApiResponse};

/// Request fields known to the JSON endpoints, used to point at the culprit.
const REQUEST_FIELDS: [&str; 3] = ["use_professional_kb", "domain", "text"];

/// Largest rejection body we re-wrap; axum's rejection texts are tiny.
const MAX_REJECTION_BYTES: usize = 64 * 1024;

async fn take_body(res: Response) -> (axum::http::response::Parts, Bytes) {
    let (parts, body) = res.into_parts();
    let bytes = axum::body::to_bytes(body, MAX_REJECTION_BYTES)
        .await
        .unwrap_or_default();
    (parts, bytes)
}

fn guess_field(msg: &str) -> Option<String> {
    REQUEST_FIELDS
        .iter()
        .find(|f| msg.contains(*f))
        .map(|f| f.to_string())
}

fn hint_for(msg: &str) -> Option<String> {
    if msg.contains("missing field") {
        Some("Send a JSON object like {\"text\": \"...\", \"domain\": \"privacy\"}.".into())
    } else if msg.contains("expected a boolean") {
        Some("use_professional_kb must be true or false.".into())
    } else if msg.contains("Content-Type") {
        Some("Set the header Content-Type: application/json.".into())
    } else {
        None
    }
}

/// Rewrites axum's plain-text 400/415/422 rejections into the JSON envelope.
pub async fn json_error_mapper(req: Request<Body>, next: Next) -> Response {
    let res = next.run(req).await;
    let status = res.status();
    let code = match status {
        StatusCode::BAD_REQUEST => "BAD_REQUEST",
        StatusCode::UNPROCESSABLE_ENTITY => "UNPROCESSABLE_ENTITY",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "UNSUPPORTED_MEDIA_TYPE",
        _ => return res,
    };
    let is_json = res
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    if is_json {
        // Already an envelope produced by a handler.
        return res;
    }

    let (mut parts, bytes) = take_body(res).await;
    let original = String::from_utf8_lossy(&bytes);
    let detail = ApiErrorDetail {
        field: guess_field(&original),
        hint: hint_for(&original),
    };
    let envelope = ApiResponse::<()>::error(code, original.trim(), vec![detail]);

    let body = match serde_json::to_vec(&envelope) {
        Ok(v) => v,
        Err(_) => bytes.to_vec(),
    };
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    parts.headers.remove(header::CONTENT_LENGTH);

    Response::from_parts(parts, body.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guesses_the_longest_matching_field_first() {
        assert_eq!(
            guess_field("invalid type: string \"yes\", expected a boolean at use_professional_kb"),
            Some("use_professional_kb".into())
        );
        assert_eq!(guess_field("missing field `text`"), Some("text".into()));
        assert_eq!(guess_field("EOF while parsing"), None);
    }

    #[test]
    fn hints_cover_common_rejections() {
        assert!(hint_for("missing field `text`").is_some());
        assert!(hint_for("Expected request with `Content-Type: application/json`").is_some());
        assert!(hint_for("something else").is_none());
    }
}

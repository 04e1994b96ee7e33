//! HTTP error shaping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use ledgerflow_infra::submitter::SubmitError;

/// Uniform error body: `{"error": {"code", "message"}}`.
pub fn json_error(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(json!({
            "error": {
                "code": code,
                "message": message,
            }
        })),
    )
        .into_response()
}

pub fn submit_error_to_response(err: &SubmitError) -> Response {
    match err {
        SubmitError::Persistence(e) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "persistence_error",
            &e.to_string(),
        ),
        SubmitError::Serialization(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "serialization_error", msg)
        }
        SubmitError::Dispatch(msg) => json_error(StatusCode::BAD_GATEWAY, "dispatch_error", msg),
    }
}

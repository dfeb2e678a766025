//! # Response Formatting
//!
//! Uniform writers for JSON payloads, JSON errors and empty bodies.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// Error response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Serialize `payload` as JSON with the given status
pub fn respond_with_json<T: Serialize>(status: StatusCode, payload: T) -> Response {
    (status, Json(payload)).into_response()
}

/// Write `{"error": message}` with the given status
pub fn respond_with_error(status: StatusCode, message: &str) -> Response {
    respond_with_json(
        status,
        ErrorResponse {
            error: message.to_string(),
        },
    )
}

/// Status with an empty body
pub fn respond_no_content(status: StatusCode) -> Response {
    status.into_response()
}

//! # REST API Errors
//!
//! Error type for the request handlers and the store-error classifier.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use super::response::respond_with_error;
use crate::store::StoreError;

/// Result type for handler operations
pub type RestResult<T> = Result<T, RestError>;

/// REST API errors
#[derive(Debug, Clone, Error)]
pub enum RestError {
    /// Request body could not be decoded into the record shape
    #[error("{0}")]
    InvalidBody(String),

    /// Failure reported by the gear store
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RestError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            RestError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            RestError::Store(err) => classify(err),
        }
    }
}

/// Map a store failure to the status reported to the client
///
/// Only the store's "no documents" signal is distinguished. Malformed
/// path identifiers arrive here as `Validation` and are reported as 500
/// like every other store failure.
pub fn classify(err: &StoreError) -> StatusCode {
    match err {
        StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        StoreError::Conflict { .. }
        | StoreError::Persistence(_)
        | StoreError::Validation(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "request failed");
        }
        respond_with_error(status, &self.to_string())
    }
}

//! HTTP error mapping
//!
//! Every failure leaves the service as a JSON body of the form
//! `{"error": {"code": "...", "message": "..."}}`.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use beatpad_common::{Error, NotFoundError};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Domain error from the common library
    #[error(transparent)]
    Common(#[from] Error),

    /// Body was not JSON or did not match the payload shape (400)
    #[error("Invalid request body: {0}")]
    BadRequest(String),

    /// Path segment did not parse as an id (400)
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::InvalidPath(rejection.body_text())
    }
}

impl From<beatpad_common::ValidationError> for ApiError {
    fn from(err: beatpad_common::ValidationError) -> Self {
        ApiError::Common(err.into())
    }
}

fn not_found_code(err: &NotFoundError) -> &'static str {
    match err {
        NotFoundError::Page(_) => "PAGE_NOT_FOUND",
        NotFoundError::Beat(_) => "BEAT_NOT_FOUND",
        NotFoundError::Text(_) => "TEXT_NOT_FOUND",
        NotFoundError::User(_) => "USER_NOT_FOUND",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            ApiError::InvalidPath(msg) => (StatusCode::BAD_REQUEST, "INVALID_PATH", msg.clone()),
            ApiError::Common(Error::Validation(err)) => {
                (StatusCode::BAD_REQUEST, err.code(), err.to_string())
            }
            ApiError::Common(Error::NotFound(err)) => {
                (StatusCode::NOT_FOUND, not_found_code(err), err.to_string())
            }
            ApiError::Common(Error::Conflict(err)) => {
                (StatusCode::CONFLICT, err.code(), err.to_string())
            }
            ApiError::Common(err) => {
                error!("Request failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "internal server error".to_string(),
                )
            }
        };

        if status.is_client_error() {
            warn!("Rejected request ({}): {}", error_code, message);
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

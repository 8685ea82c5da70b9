//! API error handling for the HTTP layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::FileAccessError;

/// API error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Bad request (400).
    BadRequest,
    /// Unauthorized (401).
    Unauthorized,
    /// Not found (404).
    NotFound,
    /// Payload too large (413).
    PayloadTooLarge,
    /// Internal server error (500).
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Error details.
    pub error: ErrorDetail,
}

/// Error detail.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
}

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Create a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    /// Create an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Create a payload too large error.
    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PayloadTooLarge, message)
    }

    /// Create an internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// The error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Map an extractor rejection on a read endpoint to the uniform 404.
    pub fn read_rejection(rejection: impl std::fmt::Display) -> Self {
        tracing::debug!("Read request rejected: {}", rejection);
        ApiError::not_found("Not found")
    }

    /// Map an extractor rejection on the upload endpoint to the uniform 400.
    pub fn upload_rejection(rejection: impl std::fmt::Display) -> Self {
        tracing::debug!("Upload request rejected: {}", rejection);
        ApiError::bad_request("Invalid upload path")
    }

    /// Map an error raised while handling an upload.
    ///
    /// Paths that are malformed and paths that escape the storage root share
    /// one response so the two can't be told apart.
    pub fn for_upload(err: FileAccessError) -> Self {
        match err {
            FileAccessError::Unauthorized => ApiError::unauthorized("Invalid upload token"),
            FileAccessError::Confinement(_)
            | FileAccessError::Validation(_)
            | FileAccessError::NotFound(_) => ApiError::bad_request("Invalid upload path"),
            FileAccessError::PayloadTooLarge(limit) => {
                ApiError::payload_too_large(format!("Upload exceeds limit of {limit} bytes"))
            }
            other => internal_error(other),
        }
    }
}

fn internal_error(err: FileAccessError) -> ApiError {
    tracing::error!("Internal error: {}", err);
    ApiError::internal("An internal error occurred")
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.status_code();
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Mapping for read endpoints (listing and download).
///
/// A missing entry, a malformed path and a path outside the storage root
/// all produce the same 404.
impl From<FileAccessError> for ApiError {
    fn from(err: FileAccessError) -> Self {
        match err {
            FileAccessError::Confinement(_)
            | FileAccessError::Validation(_)
            | FileAccessError::NotFound(_) => ApiError::not_found("Not found"),
            FileAccessError::Unauthorized => ApiError::unauthorized("Invalid upload token"),
            FileAccessError::PayloadTooLarge(limit) => {
                ApiError::payload_too_large(format!("Upload exceeds limit of {limit} bytes"))
            }
            other => internal_error(other),
        }
    }
}

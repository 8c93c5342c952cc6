/// Unified error types for fedinfo
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the service
///
/// `MissingParameter` and `InvalidInput` are caller mistakes and are kept
/// apart from the remaining variants so the HTTP layer can answer them with a
/// 400 instead of a generic failure.
#[derive(Error, Debug)]
pub enum FedinfoError {
    /// A required input was absent
    #[error("missing mandatory parameter: {0}")]
    MissingParameter(String),

    /// Input could not be interpreted
    #[error("{0}")]
    InvalidInput(String),

    /// Network failure or undecodable response during NodeInfo discovery
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FedinfoError {
    /// Whether the caller can fix this error by changing the request
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            FedinfoError::MissingParameter(_) | FedinfoError::InvalidInput(_)
        )
    }

    /// Machine-readable code for the response body
    pub fn error_code(&self) -> &'static str {
        match self {
            FedinfoError::MissingParameter(_) => "MissingParameter",
            FedinfoError::InvalidInput(_) => "InvalidInput",
            _ => "InternalServerError",
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Convert FedinfoError to HTTP response
impl IntoResponse for FedinfoError {
    fn into_response(self) -> Response {
        let (status, message) = if self.is_user_error() {
            (StatusCode::BAD_REQUEST, self.to_string())
        } else {
            tracing::error!("unhandled error in http request handler: {}", self);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(), // Don't leak details
            )
        };

        let body = Json(ErrorResponse {
            error: self.error_code().to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for fedinfo operations
pub type FedinfoResult<T> = Result<T, FedinfoError>;

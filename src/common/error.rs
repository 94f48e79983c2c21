// Error handling types for the API

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::fmt;
use tracing::error;

use super::validation::ValidationResult;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed fields, disallowed email domain
    InvalidInput(String),
    /// Wrong password, or a federated-only account trying password login
    InvalidCredentials(String),
    /// No authenticated session
    Unauthorized(String),
    /// Authenticated, but the resource belongs to another user
    Forbidden(String),
    NotFound(String),
    /// Email already registered
    Conflict(String),
    /// AI completion or OAuth provider failed
    Upstream(String),
    InternalServer(String),
    DatabaseError(sqlx::Error),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidInput(msg) => write!(f, "Invalid Input: {}", msg),
            ApiError::InvalidCredentials(msg) => write!(f, "Invalid Credentials: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::Upstream(msg) => write!(f, "Upstream Failure: {}", msg),
            ApiError::InternalServer(msg) => write!(f, "Internal Server Error: {}", msg),
            ApiError::DatabaseError(e) => write!(f, "Database Error: {}", e),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::DatabaseError(e)
    }
}

/// JSON error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials(_) | ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::InternalServer(_) | ApiError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let (error_message, code) = match self {
            ApiError::InvalidInput(msg) => (msg, "INVALID_INPUT"),
            ApiError::InvalidCredentials(msg) => (msg, "INVALID_CREDENTIALS"),
            ApiError::Unauthorized(msg) => (msg, "UNAUTHORIZED"),
            ApiError::Forbidden(msg) => (msg, "FORBIDDEN"),
            ApiError::NotFound(msg) => (msg, "NOT_FOUND"),
            ApiError::Conflict(msg) => (msg, "CONFLICT"),
            ApiError::Upstream(msg) => {
                error!(error = %msg, "Upstream service failure");
                ("Upstream service failed".to_string(), "UPSTREAM_FAILURE")
            }
            ApiError::InternalServer(msg) => {
                error!(error = %msg, "Internal server error");
                ("Internal server error".to_string(), "INTERNAL_SERVER_ERROR")
            }
            ApiError::DatabaseError(e) => {
                error!(error = %e, "Database error occurred");
                (
                    "Database operation failed".to_string(),
                    "DATABASE_ERROR",
                )
            }
        };

        let error_response = ErrorResponse {
            success: false,
            error: error_message,
            code: code.to_string(),
        };

        (status, Json(error_response)).into_response()
    }
}

/// Helper function to convert ValidationResult to ApiError
impl From<ValidationResult> for ApiError {
    fn from(result: ValidationResult) -> Self {
        if result.is_valid {
            ApiError::InternalServer(
                "Validation result was valid but converted to error".to_string(),
            )
        } else {
            let error_messages: Vec<String> = result
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect();
            ApiError::InvalidInput(error_messages.join(", "))
        }
    }
}

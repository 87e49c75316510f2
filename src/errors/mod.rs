//! Error handling module for the car rental backend.
//!
//! Provides centralized error types with mapping to HTTP status codes and response envelopes.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const INVALID_ID: &str = "INVALID_ID";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const NO_FIELDS_PROVIDED: &str = "NO_FIELDS_PROVIDED";
    pub const ALREADY_EXISTS: &str = "ALREADY_EXISTS";
    pub const INVALID_CREDENTIALS: &str = "INVALID_CREDENTIALS";
    pub const CONFLICT: &str = "CONFLICT";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const DEPENDENCY_FAILURE: &str = "DEPENDENCY_FAILURE";
    pub const PARTIAL_FAILURE: &str = "PARTIAL_FAILURE";
    pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Identifier is not 24 hex characters
    InvalidId(String),
    /// Resource not found
    NotFound(String),
    /// Update payload carried nothing to write
    NoFieldsProvided,
    /// Customer email already registered
    AlreadyExists(String),
    /// Name and email did not match a customer
    InvalidCredentials,
    /// Request conflicts with the current rental state
    Conflict(String),
    /// Malformed request body
    BadRequest(String),
    /// Store operation failed
    Database(String),
    /// A composite operation failed after its first write succeeded
    PartialFailure { message: String, rolled_back: bool },
    /// Invalid startup configuration
    Config(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidId(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::NoFieldsProvided => StatusCode::BAD_REQUEST,
            AppError::AlreadyExists(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::PartialFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidId(_) => codes::INVALID_ID,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::NoFieldsProvided => codes::NO_FIELDS_PROVIDED,
            AppError::AlreadyExists(_) => codes::ALREADY_EXISTS,
            AppError::InvalidCredentials => codes::INVALID_CREDENTIALS,
            AppError::Conflict(_) => codes::CONFLICT,
            AppError::BadRequest(_) => codes::BAD_REQUEST,
            AppError::Database(_) => codes::DEPENDENCY_FAILURE,
            AppError::PartialFailure { .. } => codes::PARTIAL_FAILURE,
            AppError::Config(_) => codes::CONFIG_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::InvalidId(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::NoFieldsProvided => "No valid fields to update".to_string(),
            AppError::AlreadyExists(msg) => msg.clone(),
            AppError::InvalidCredentials => "Invalid credentials".to_string(),
            AppError::Conflict(msg) => msg.clone(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Database(msg) => msg.clone(),
            AppError::PartialFailure {
                message,
                rolled_back,
            } => {
                if *rolled_back {
                    format!("{} (first write rolled back)", message)
                } else {
                    format!("{} (rollback failed, manual reconciliation required)", message)
                }
            }
            AppError::Config(msg) => msg.clone(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        AppError::Database(format!("Database error: {}", err))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        AppError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

/// Error response envelope.
///
/// `error` stays a plain string because the front-ends read `response.data.error`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: &AppError) -> Self {
        Self {
            success: false,
            error: error.message(),
            code: error.error_code().to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse::new(&self);
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::InvalidId("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Conflict("rented".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::PartialFailure {
                message: "car update failed".into(),
                rolled_back: true
            }
            .error_code(),
            codes::PARTIAL_FAILURE
        );
    }

    #[test]
    fn test_partial_failure_message_reports_rollback() {
        let rolled_back = AppError::PartialFailure {
            message: "Failed to update car availability".into(),
            rolled_back: true,
        };
        let stuck = AppError::PartialFailure {
            message: "Failed to update car availability".into(),
            rolled_back: false,
        };

        assert!(rolled_back.message().contains("rolled back"));
        assert!(stuck.message().contains("manual reconciliation"));
    }
}

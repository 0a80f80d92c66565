//! Error types for the Task API service.

use std::sync::OnceLock;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use taskvault_auth_core::AuthError;

static PRODUCTION: OnceLock<bool> = OnceLock::new();

/// Record whether the service runs in production. Called once at startup;
/// 500 responses carry error detail only outside production.
pub fn set_production(production: bool) {
    let _ = PRODUCTION.set(production);
}

fn is_production() -> bool {
    *PRODUCTION.get().unwrap_or(&true)
}

/// Error envelope returned for every failed request
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

/// A single field-level validation failure
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Task not found")]
    TaskNotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error")]
    Database(#[from] taskvault_db::DbError),

    #[error("Auth error")]
    Auth(#[from] AuthError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::TaskNotFound => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(e) => {
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::TaskNotFound => "TASK_NOT_FOUND",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Database(_) | Self::Internal(_) => "INTERNAL_ERROR",
            // Internal auth failures are masked like any other 500
            Self::Auth(e) if e.status_code() == 500 => "INTERNAL_ERROR",
            Self::Auth(e) => e.error_code(),
        }
    }

    /// User-facing message. Auth failures get fixed strings so that
    /// wrong-password and unknown-email responses are identical.
    fn message(&self) -> String {
        match self {
            Self::Validation(_) => "Validation failed".to_string(),
            Self::TaskNotFound => "Task not found".to_string(),
            Self::BadRequest(msg) => msg.clone(),
            Self::Database(_) | Self::Internal(_) if !is_production() => self.detail(),
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Auth(e) if e.status_code() == 500 && !is_production() => e.to_string(),
            Self::Auth(e) => auth_message(e).to_string(),
        }
    }

    fn detail(&self) -> String {
        match self {
            Self::Database(e) => format!("Database error: {e}"),
            Self::Internal(msg) => format!("Internal error: {msg}"),
            other => other.to_string(),
        }
    }
}

/// Fixed messages for auth failures
pub fn auth_message(error: &AuthError) -> &'static str {
    match error {
        AuthError::InvalidToken => "Invalid token",
        AuthError::TokenExpired => "Token expired",
        AuthError::MissingToken => "No token provided",
        AuthError::InvalidCredentials => "Invalid credentials",
        AuthError::EmailTaken => "User already exists",
        AuthError::UserNotFound => "User not found",
        AuthError::Database(_) | AuthError::Configuration(_) | AuthError::Internal(_) => {
            "Internal server error"
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = ?self, "Internal API error");
        }

        let errors = match &self {
            Self::Validation(errors) => Some(errors.clone()),
            _ => None,
        };

        let body = ErrorBody {
            success: false,
            message: self.message(),
            code: self.error_code().to_string(),
            errors,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

//! Auth errors

use thiserror::Error;

/// Authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// Invalid token (malformed, bad signature, not in the store)
    #[error("invalid token")]
    InvalidToken,

    /// Token has expired
    #[error("token expired")]
    TokenExpired,

    /// No token was provided
    #[error("missing token")]
    MissingToken,

    /// Invalid credentials (unknown email or wrong password)
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Email is already registered
    #[error("email already registered")]
    EmailTaken,

    /// User not found
    #[error("user not found")]
    UserNotFound,

    /// Database error
    #[error("database error: {0}")]
    Database(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidToken
            | Self::TokenExpired
            | Self::MissingToken
            | Self::InvalidCredentials => 401,
            // Duplicate email is reported as a plain bad request
            Self::EmailTaken => 400,
            Self::UserNotFound => 404,
            Self::Database(_) | Self::Configuration(_) | Self::Internal(_) => 500,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::MissingToken => "NO_TOKEN",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::EmailTaken => "EMAIL_TAKEN",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<taskvault_db::DbError> for AuthError {
    fn from(err: taskvault_db::DbError) -> Self {
        tracing::error!("Database error: {}", err);
        Self::Database(err.to_string())
    }
}

//! Database errors

use thiserror::Error;

/// Database errors
#[derive(Error, Debug)]
pub enum DbError {
    /// SQLx error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Record not found
    #[error("record not found")]
    NotFound,
}

impl DbError {
    /// True when the underlying driver reported a unique-constraint
    /// violation (duplicate email, duplicate token value).
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Sqlx(sqlx::Error::Database(db)) => db.is_unique_violation(),
            _ => false,
        }
    }
}

/// Result type for database operations
pub type DbResult<T> = Result<T, DbError>;

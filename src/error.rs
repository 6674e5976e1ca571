//! Error types for schedauth.

use thiserror::Error;

/// Common error type for schedauth.
#[derive(Error, Debug)]
pub enum SchedAuthError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Password hashing error.
    #[error("password error: {0}")]
    Password(#[from] crate::auth::PasswordError),

    /// Validation error for input or stored data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for SchedAuthError {
    fn from(e: sqlx::Error) -> Self {
        SchedAuthError::Database(e.to_string())
    }
}

/// Result type alias for schedauth operations.
pub type Result<T> = std::result::Result<T, SchedAuthError>;

//! Error types for the availability Lambda functions.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur across the availability service.
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Database migration error
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Malformed calendar date
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Write attempted without a caller identity
    #[error("Must be logged in to update availability")]
    NotAuthenticated,

    /// Authentication error
    #[error("Authentication error: {0}")]
    Auth(String),
}

impl Error {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::InvalidDate(_) => 400,
            Error::NotAuthenticated | Error::Auth(_) => 401,
            _ => 500,
        }
    }
}

//! Error types for repository operations.

use crate::models::Day;

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Data validation error: {0}")]
    ValidationError(String),

    /// A storage uniqueness key rejected a write that raced past the
    /// caller's validation read. Services convert this into the matching
    /// conflict rejection rather than surfacing it as a storage fault.
    #[error("Unique constraint {constraint} violated at {day} P{period}")]
    ConstraintViolation {
        constraint: &'static str,
        day: Day,
        period: u8,
    },

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<String> for RepositoryError {
    fn from(s: String) -> Self {
        RepositoryError::InternalError(s)
    }
}

impl From<&str> for RepositoryError {
    fn from(s: &str) -> Self {
        RepositoryError::InternalError(s.to_string())
    }
}

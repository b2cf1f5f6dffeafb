//! Error types for ti-staging.

use thiserror::Error;

/// Errors raised by the staging store.
#[derive(Debug, Error)]
pub enum StagingError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Alias for `Result<T, StagingError>`.
pub type StagingResult<T> = Result<T, StagingError>;

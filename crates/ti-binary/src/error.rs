//! Error types for ti-binary.

use thiserror::Error;

use ti_core::{CoreError, RouteId, TileRect};

/// Errors raised while writing or reading a transport index.
#[derive(Debug, Error)]
pub enum BinaryError {
    /// A writer call that is not legal in the current state.
    #[error("{op} not allowed in writer state {state}")]
    InvalidState { op: &'static str, state: String },

    #[error("malformed tree rect {0:?}")]
    MalformedRect(TileRect),

    #[error("route {0} written twice")]
    DuplicateRoute(RouteId),

    #[error("message of {0} bytes exceeds the 4-byte length prefix")]
    MessageTooLarge(u64),

    #[error("decode error at byte {offset}: {reason}")]
    Decode { offset: usize, reason: String },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Alias for `Result<T, BinaryError>`.
pub type BinaryResult<T> = Result<T, BinaryError>;

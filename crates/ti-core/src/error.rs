//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`.

use thiserror::Error;

/// Errors produced by `ti-core`.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid coordinate lat={lat}, lon={lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `ti-core`.
pub type CoreResult<T> = Result<T, CoreError>;

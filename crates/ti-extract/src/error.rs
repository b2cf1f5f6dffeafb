//! Extraction error type.
//!
//! Rejected relations are not errors (the extractor returns `None`); only
//! loader failures end up here.

use thiserror::Error;

/// Errors produced by `ti-extract`.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "osm")]
    #[error("OSM parse error: {0}")]
    Osm(String),
}

pub type ExtractResult<T> = Result<T, ExtractError>;

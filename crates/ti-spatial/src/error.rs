//! Spatial-subsystem error type.

use thiserror::Error;

use ti_core::StopId;

/// Errors produced by `ti-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("stop {stop} has no valid tile rect (lat={lat}, lon={lon})")]
    MalformedRect { stop: StopId, lat: f64, lon: f64 },

    #[error("corrupt tree file: {0}")]
    CorruptTree(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SpatialResult<T> = Result<T, SpatialError>;

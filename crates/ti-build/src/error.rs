use thiserror::Error;

use ti_binary::BinaryError;
use ti_core::CoreError;
use ti_extract::ExtractError;
use ti_spatial::SpatialError;
use ti_staging::StagingError;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("build configuration error: {0}")]
    Core(#[from] CoreError),

    #[error("extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("staging error: {0}")]
    Staging(#[from] StagingError),

    #[error("stop tree error: {0}")]
    Spatial(#[from] SpatialError),

    #[error("index write error: {0}")]
    Binary(#[from] BinaryError),
}

pub type BuildResult<T> = Result<T, BuildError>;

//! Build configuration.

use std::path::{Path, PathBuf};

use crate::{CoreError, CoreResult};

/// Pending records per staging batch before an execute + commit.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// File name of the staging database inside a work directory.
pub const STAGING_FILE_NAME: &str = "transport.db";

/// File name of the stop R-tree node file inside a work directory.
pub const TREE_FILE_NAME: &str = "transport_stops.rtree";

/// Paths and knobs for one index build.
///
/// There is no zoom setting: every phase quantizes at
/// [`STOP_ZOOM`](crate::STOP_ZOOM).
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuildConfig {
    /// Staging database.  Deleted and recreated at the start of a build.
    pub staging_path: PathBuf,

    /// R-tree node file.  Deleted and recreated at the start of a build.
    pub tree_path: PathBuf,

    /// Region name written into the index header.
    pub region_name: String,

    /// Staging batch threshold.  Default: [`DEFAULT_BATCH_SIZE`].
    pub batch_size: usize,
}

impl BuildConfig {
    /// Config with both intermediate files placed in `work_dir`.
    pub fn new(work_dir: &Path, region_name: impl Into<String>) -> Self {
        Self {
            staging_path: work_dir.join(STAGING_FILE_NAME),
            tree_path:    work_dir.join(TREE_FILE_NAME),
            region_name:  region_name.into(),
            batch_size:   DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.region_name.trim().is_empty() {
            return Err(CoreError::Config("region name must not be empty".into()));
        }
        if self.batch_size == 0 {
            return Err(CoreError::Config("batch size must be at least 1".into()));
        }
        if self.staging_path == self.tree_path {
            return Err(CoreError::Config(format!(
                "staging database and tree file share the path {}",
                self.staging_path.display()
            )));
        }
        Ok(())
    }
}

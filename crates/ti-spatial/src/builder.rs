//! In-memory stop R-tree used while routes are being ingested.

use std::fs::File;
use std::path::{Path, PathBuf};

use rstar::{RTree, RTreeObject, AABB};

use ti_core::{StopId, TileRect, TransportStop, STOP_ZOOM};

use crate::node_file::{self, StopTree};
use crate::{SpatialError, SpatialResult};

// ── R-tree entry ──────────────────────────────────────────────────────────────

/// A stop at its quantized `[x, y]` tile coordinate.
///
/// Coordinates are widened to `i64` so that rstar's area and margin
/// arithmetic cannot overflow at zoom 24.
#[derive(Clone, Debug)]
pub(crate) struct StopEntry {
    pub(crate) point: [i64; 2],
    pub(crate) stop:  StopId,
}

impl StopEntry {
    pub(crate) fn rect(&self) -> TileRect {
        let (x, y) = (self.point[0] as i32, self.point[1] as i32);
        TileRect::new(x, y, x, y)
    }
}

impl RTreeObject for StopEntry {
    type Envelope = AABB<[i64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

// ── SpatialIndexBuilder ───────────────────────────────────────────────────────

/// Accumulates stops and pages the finished tree out to a node file.
///
/// The tree lives in memory until [`flush`](Self::flush), so memory grows
/// linearly with the number of inserted stops (one point and one id each).
///
/// ```rust,ignore
/// let mut spatial = SpatialIndexBuilder::create(&config.tree_path)?;
/// spatial.insert(&stop)?;
/// let mut tree = spatial.flush()?;
/// let root = tree.root()?;
/// ```
pub struct SpatialIndexBuilder {
    path: PathBuf,
    file: File,
    tree: RTree<StopEntry>,
}

impl SpatialIndexBuilder {
    /// Start a new tree backed by `path`.  Any existing file there is
    /// replaced.
    pub fn create(path: &Path) -> SpatialResult<Self> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        let file = File::create(path)?;
        Ok(Self { path: path.to_path_buf(), file, tree: RTree::new() })
    }

    /// Insert `stop` as a point rect at its tile coordinate.
    ///
    /// Each stop id must be inserted at most once; the tree does not check.
    pub fn insert(&mut self, stop: &TransportStop) -> SpatialResult<()> {
        let tile = stop.location.to_tile(STOP_ZOOM).map_err(|_| SpatialError::MalformedRect {
            stop: stop.id,
            lat:  stop.location.lat,
            lon:  stop.location.lon,
        })?;
        self.tree.insert(StopEntry {
            point: [i64::from(tile.x), i64::from(tile.y)],
            stop:  stop.id,
        });
        Ok(())
    }

    /// Number of leaves inserted so far.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Serialize the tree to the node file and reopen it read-only.
    pub fn flush(self) -> SpatialResult<StopTree> {
        let header = node_file::write_tree(self.file, &self.tree)?;
        log::debug!(
            "stop tree flushed to {}: {} leaves, height {}",
            self.path.display(),
            header.leaf_count,
            header.height
        );
        StopTree::open(&self.path)
    }
}

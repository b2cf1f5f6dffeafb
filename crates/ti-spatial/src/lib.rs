//! `ti-spatial`: the stop R-tree.
//!
//! During ingestion every distinct stop is inserted as a degenerate rect at
//! its quantized tile coordinate ([`STOP_ZOOM`](ti_core::STOP_ZOOM)).  The
//! tree is held by `rstar` while it is built; [`SpatialIndexBuilder::flush`]
//! pages it out to a node file and returns a [`StopTree`] that reads nodes
//! back from disk by offset for the write-back walk.
//!
//! | Module        | Contents                                           |
//! |---------------|----------------------------------------------------|
//! | [`builder`]   | `SpatialIndexBuilder`                              |
//! | [`node_file`] | node file layout, `StopTree`, `TreeNode`, `Element`|
//! | [`error`]     | `SpatialError`, `SpatialResult`                    |

pub mod builder;
pub mod error;
pub mod node_file;


pub use builder::SpatialIndexBuilder;
pub use error::{SpatialError, SpatialResult};
pub use node_file::{Element, StopTree, TreeNode};

//! `ti-build`: drives a complete transport index build.
//!
//! ```text
//! Relation ──extract──▶ TransportRoute ──ingest──▶ StagingStore + SpatialIndexBuilder
//!                                                        │ finish / flush
//!                                                        ▼
//!                     index file ◀──write_index── StagingReader + StopTree
//! ```
//!
//! The write-back walks the flushed stop tree node by node and queries
//! staging for every leaf, so the index mirrors the tree's shape.
//!
//! | Module      | Contents                                          |
//! |-------------|---------------------------------------------------|
//! | [`builder`] | `TransportIndexBuilder`                           |
//! | [`summary`] | `IngestSummary`, `WriteSummary`, `BuildSummary`   |
//! | [`error`]   | `BuildError`, `BuildResult`                       |

pub mod builder;
pub mod error;
pub mod summary;

#[cfg(test)]
mod tests;

pub use builder::TransportIndexBuilder;
pub use error::{BuildError, BuildResult};
pub use summary::{BuildSummary, IngestSummary, WriteSummary};

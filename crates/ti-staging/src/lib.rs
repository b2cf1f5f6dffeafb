//! `ti-staging`: the SQLite staging store between extraction and index
//! write-back.
//!
//! Ingestion appends routes, stops, and route-stop associations through
//! [`StagingStore`], which buffers each record kind in a [`RecordBatch`] and
//! commits it in one transaction per threshold.  Write-back reads the
//! committed content through [`StagingReader`].
//!
//! | Module    | Contents                                            |
//! |-----------|-----------------------------------------------------|
//! | [`row`]   | `RouteRow`, `StopRow`, `RouteStopRow`               |
//! | [`batch`] | `StagingRecord`, `RecordBatch`                      |
//! | [`store`] | `StagingStore`, `StagingReader`, schema             |
//! | [`error`] | `StagingError`, `StagingResult`                     |
//!
//! # Usage
//!
//! ```rust,ignore
//! let mut store = StagingStore::create(&config.staging_path, config.batch_size)?;
//! store.insert_route(RouteRow::from(&route))?;
//! let reader = store.finish()?;
//! for row in reader.routes()? { /* … */ }
//! ```

pub mod batch;
pub mod error;
pub mod row;
pub mod store;

#[cfg(test)]
mod tests;

pub use batch::{RecordBatch, StagingRecord};
pub use error::{StagingError, StagingResult};
pub use row::{RouteRow, RouteStopRow, StopRow};
pub use store::{StagingCounts, StagingReader, StagingStore, TRANSPORT_TABLE_VERSION};

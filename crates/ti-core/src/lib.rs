//! `ti-core`: foundational types for the transport index builder.
//!
//! This crate is a dependency of every other `ti-*` crate.  It has no `ti-*`
//! dependencies and only `thiserror` (plus optional `serde`) externally.
//!
//! # What lives here
//!
//! | Module        | Contents                                               |
//! |---------------|--------------------------------------------------------|
//! | [`ids`]       | `StopId`, `RouteId`, `OutputRouteId`                   |
//! | [`geo`]       | `GeoPoint`, tile projection, `TilePoint`, `TileRect`   |
//! | [`transport`] | `TransportMode`, string-table seed names               |
//! | [`model`]     | `TransportRoute`, `TransportStop`, `Direction`         |
//! | [`config`]    | `BuildConfig`                                          |
//! | [`error`]     | `CoreError`, `CoreResult`                              |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod model;
pub mod transport;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{BuildConfig, DEFAULT_BATCH_SIZE};
pub use error::{CoreError, CoreResult};
pub use geo::{GeoPoint, TilePoint, TileRect, MAX_LATITUDE, STOP_ZOOM};
pub use ids::{OutputRouteId, RouteId, StopId};
pub use model::{Direction, RouteWay, TransportRoute, TransportStop};
pub use transport::{TransportMode, SEED_MODE_NAMES};

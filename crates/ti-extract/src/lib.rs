//! `ti-extract`: turn tagged route relations into ordered transport routes.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`relation`]  | `Relation`, `RelationMember`, `OsmNode`, `OsmWay`         |
//! | [`extractor`] | `RouteExtractor`, ordinal resolution                      |
//! | [`osm`]       | `load_route_relations` (feature = `"osm"` only)           |
//! | [`error`]     | `ExtractError`, `ExtractResult<T>`                        |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                      |
//! |---------|-------------------------------------------------------------|
//! | `osm`   | Enables OSM PBF loading via the `osmpbf` crate.             |
//! | `serde` | Derives `Serialize`/`Deserialize` on `ti-core` types.       |

pub mod error;
pub mod extractor;
pub mod relation;

#[cfg(feature = "osm")]
pub mod osm;


pub use error::{ExtractError, ExtractResult};
pub use extractor::{BackwardOrdinal, RouteExtractor};
pub use relation::{MemberElement, OsmNode, OsmWay, Relation, RelationMember, Tags};

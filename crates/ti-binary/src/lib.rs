//! `ti-binary`: the binary transport index.
//!
//! | Module      | Contents                                                 |
//! |-------------|----------------------------------------------------------|
//! | [`wire`]    | varint/zigzag field codec, `WireReader`                  |
//! | [`format`]  | message field numbers                                    |
//! | [`strings`] | `StringTable`, English-name suppression                  |
//! | [`writer`]  | `BinaryIndexWriter` state machine, `RouteRecord`         |
//! | [`reader`]  | `read_index`, decoded `TransportIndex`                   |
//! | [`error`]   | `BinaryError`, `BinaryResult`                            |
//!
//! The writer streams into any `Write + Seek` sink; tests use
//! `Cursor<Vec<u8>>` and decode the result with [`read_index`].

pub mod error;
pub mod format;
pub mod reader;
pub mod strings;
pub mod wire;
pub mod writer;


pub use error::{BinaryError, BinaryResult};
pub use reader::{read_index, IndexRoute, IndexRouteStop, IndexStop, IndexTreeNode, TransportIndex};
pub use strings::{english_name, StringTable};
pub use writer::{BinaryIndexWriter, RouteRecord, WriterState};

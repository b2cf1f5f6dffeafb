//! Streaming writer for the transport index.
//!
//! # Call order
//!
//! ```text
//! start_index → start_routes → write_route* → end_routes
//!     → ( start_tree_element (start_tree_element | write_stop | end_tree_element)* end_tree_element
//!       | skip_tree )
//!     → write_string_table → finish
//! ```
//!
//! Tree elements nest; the first one opened is the root box.  Every call
//! outside this order fails with [`BinaryError::InvalidState`] and leaves the
//! writer unchanged.
//!
//! Nested messages get a zeroed 4-byte length when opened; closing a message
//! seeks back, patches the length, and returns to the end of the stream.

use std::io::{Seek, SeekFrom, Write};

use rustc_hash::FxHashMap;

use ti_core::{OutputRouteId, RouteId, TileRect, TransportStop, STOP_ZOOM};

use crate::format::{self, file, index, route, route_stop, routes, stop, string_table, tree};
use crate::strings::{english_name, StringTable};
use crate::wire::{self, MESSAGE_LEN_BYTES, WIRE_LEN};
use crate::{BinaryError, BinaryResult};

// ── Writer state ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    NotStarted,
    IndexOpen,
    RoutesOpen,
    RoutesClosed,
    /// Inside `depth` nested tree elements (`depth >= 1`).
    TreeOpen(usize),
    TreeClosed,
    /// Only [`BinaryIndexWriter::finish`] remains, which consumes the writer.
    StringsWritten,
}

/// One route as handed to [`BinaryIndexWriter::write_route`].
#[derive(Debug, Clone, Copy)]
pub struct RouteRecord<'a> {
    pub id:       RouteId,
    /// Mode name, e.g. `"bus"`.
    pub mode:     &'a str,
    pub operator: Option<&'a str>,
    pub r#ref:    &'a str,
    pub name:     &'a str,
    pub name_en:  Option<&'a str>,
    /// Average stop distance in metres.
    pub distance: u32,
    pub forward:  &'a [TransportStop],
    pub backward: &'a [TransportStop],
}

// ── BinaryIndexWriter ─────────────────────────────────────────────────────────

/// Writes one transport index to `out`.
///
/// Owns the string table and the route id remap for the lifetime of the
/// write.
pub struct BinaryIndexWriter<W: Write + Seek> {
    out:     W,
    state:   WriterState,
    strings: StringTable,
    remap:   FxHashMap<RouteId, OutputRouteId>,
    /// Start offsets of the open messages' length prefixes.
    open:    Vec<u64>,
    /// Boxes of the open tree elements, root first.
    bounds:  Vec<TileRect>,
}

impl<W: Write + Seek> BinaryIndexWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            state:   WriterState::NotStarted,
            strings: StringTable::seeded(),
            remap:   FxHashMap::default(),
            open:    Vec::new(),
            bounds:  Vec::new(),
        }
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    pub fn strings(&self) -> &StringTable {
        &self.strings
    }

    /// Output id assigned to `id`, if the route has been written.
    pub fn output_id(&self, id: RouteId) -> Option<OutputRouteId> {
        self.remap.get(&id).copied()
    }

    /// Routes written so far.
    pub fn route_count(&self) -> usize {
        self.remap.len()
    }

    fn invalid(&self, op: &'static str) -> BinaryError {
        BinaryError::InvalidState { op, state: format!("{:?}", self.state) }
    }

    // ── Message framing ───────────────────────────────────────────────────

    fn open_message(&mut self, field: u32) -> BinaryResult<()> {
        wire::write_tag(&mut self.out, field, WIRE_LEN)?;
        let at = self.out.stream_position()?;
        self.out.write_all(&[0u8; MESSAGE_LEN_BYTES])?;
        self.open.push(at);
        Ok(())
    }

    fn close_message(&mut self) -> BinaryResult<()> {
        let Some(at) = self.open.pop() else {
            return Err(self.invalid("close_message"));
        };
        let end = self.out.stream_position()?;
        let len = end - at - MESSAGE_LEN_BYTES as u64;
        let len = u32::try_from(len).map_err(|_| BinaryError::MessageTooLarge(len))?;
        self.out.seek(SeekFrom::Start(at))?;
        self.out.write_all(&len.to_be_bytes())?;
        self.out.seek(SeekFrom::Start(end))?;
        Ok(())
    }

    // ── Header and routes ─────────────────────────────────────────────────

    /// Write the file header and open the index named `name`.
    pub fn start_index(&mut self, name: &str) -> BinaryResult<()> {
        if self.state != WriterState::NotStarted {
            return Err(self.invalid("start_index"));
        }
        wire::write_uint_field(&mut self.out, file::VERSION, format::INDEX_VERSION)?;
        self.open_message(file::TRANSPORT_INDEX)?;
        wire::write_string_field(&mut self.out, index::NAME, name)?;
        self.state = WriterState::IndexOpen;
        Ok(())
    }

    pub fn start_routes(&mut self) -> BinaryResult<()> {
        if self.state != WriterState::IndexOpen {
            return Err(self.invalid("start_routes"));
        }
        self.open_message(index::ROUTES)?;
        self.state = WriterState::RoutesOpen;
        Ok(())
    }

    /// Emit one route and assign it the next output id.
    pub fn write_route(&mut self, r: &RouteRecord<'_>) -> BinaryResult<OutputRouteId> {
        if self.state != WriterState::RoutesOpen {
            return Err(self.invalid("write_route"));
        }
        if self.remap.contains_key(&r.id) {
            return Err(BinaryError::DuplicateRoute(r.id));
        }
        let output = OutputRouteId::try_from(self.remap.len())
            .map_err(|_| BinaryError::MessageTooLarge(self.remap.len() as u64))?;

        self.open_message(routes::ROUTE)?;
        wire::write_uint_field(&mut self.out, route::ID, r.id.0 as u64)?;
        let mode = self.strings.register(r.mode);
        wire::write_uint_field(&mut self.out, route::TYPE, u64::from(mode))?;
        if let Some(operator) = r.operator {
            let sid = self.strings.register(operator);
            wire::write_uint_field(&mut self.out, route::OPERATOR, u64::from(sid))?;
        }
        wire::write_string_field(&mut self.out, route::REF, r.r#ref)?;
        self.write_names(route::NAME, route::NAME_EN, r.name, r.name_en)?;
        wire::write_uint_field(&mut self.out, route::DISTANCE, u64::from(r.distance))?;
        self.write_route_stops(route::FORWARD_STOP, r.forward)?;
        self.write_route_stops(route::BACKWARD_STOP, r.backward)?;
        self.close_message()?;

        self.remap.insert(r.id, output);
        Ok(output)
    }

    fn write_names(
        &mut self,
        name_field: u32,
        name_en_field: u32,
        name: &str,
        name_en: Option<&str>,
    ) -> BinaryResult<()> {
        let sid = self.strings.register(name);
        wire::write_uint_field(&mut self.out, name_field, u64::from(sid))?;
        if let Some(en) = english_name(name, name_en) {
            let sid = self.strings.register(en);
            wire::write_uint_field(&mut self.out, name_en_field, u64::from(sid))?;
        }
        Ok(())
    }

    fn write_route_stops(&mut self, field: u32, stops: &[TransportStop]) -> BinaryResult<()> {
        let (mut prev_id, mut prev_x, mut prev_y) = (0i64, 0i64, 0i64);
        for s in stops {
            let tile = s.location.to_tile(STOP_ZOOM)?;
            let (x, y) = (i64::from(tile.x), i64::from(tile.y));
            self.open_message(field)?;
            wire::write_sint_field(&mut self.out, route_stop::ID, s.id.0.wrapping_sub(prev_id))?;
            wire::write_sint_field(&mut self.out, route_stop::DX, x - prev_x)?;
            wire::write_sint_field(&mut self.out, route_stop::DY, y - prev_y)?;
            self.write_names(route_stop::NAME, route_stop::NAME_EN, &s.name, s.name_en.as_deref())?;
            self.close_message()?;
            (prev_id, prev_x, prev_y) = (s.id.0, x, y);
        }
        Ok(())
    }

    pub fn end_routes(&mut self) -> BinaryResult<()> {
        if self.state != WriterState::RoutesOpen {
            return Err(self.invalid("end_routes"));
        }
        self.close_message()?;
        self.state = WriterState::RoutesClosed;
        log::debug!("route section closed: {} routes", self.remap.len());
        Ok(())
    }

    // ── Stop tree ─────────────────────────────────────────────────────────

    /// Open a tree element covering `rect`.  The first call opens the root.
    pub fn start_tree_element(&mut self, rect: TileRect) -> BinaryResult<()> {
        let depth = match self.state {
            WriterState::RoutesClosed => 0,
            WriterState::TreeOpen(depth) => depth,
            _ => return Err(self.invalid("start_tree_element")),
        };
        if !rect.is_well_formed() {
            return Err(BinaryError::MalformedRect(rect));
        }
        let parent = self.bounds.last().copied().unwrap_or(TileRect::new(0, 0, 0, 0));
        let field = if depth == 0 { index::STOPS_TREE } else { tree::SUBTREE };
        self.open_message(field)?;
        let delta = |a: i32, b: i32| i64::from(a) - i64::from(b);
        wire::write_sint_field(&mut self.out, tree::LEFT, delta(rect.min_x, parent.min_x))?;
        wire::write_sint_field(&mut self.out, tree::RIGHT, delta(rect.max_x, parent.max_x))?;
        wire::write_sint_field(&mut self.out, tree::TOP, delta(rect.min_y, parent.min_y))?;
        wire::write_sint_field(&mut self.out, tree::BOTTOM, delta(rect.max_y, parent.max_y))?;
        self.bounds.push(rect);
        self.state = WriterState::TreeOpen(depth + 1);
        Ok(())
    }

    /// Emit a stop inside the innermost open tree element.
    ///
    /// Routes without an output id are logged and left out; the return value
    /// is how many were left out.
    pub fn write_stop(&mut self, s: &TransportStop, route_ids: &[RouteId]) -> BinaryResult<usize> {
        if !matches!(self.state, WriterState::TreeOpen(_)) {
            return Err(self.invalid("write_stop"));
        }
        let Some(enclosing) = self.bounds.last().copied() else {
            return Err(self.invalid("write_stop"));
        };
        let tile = s.location.to_tile(STOP_ZOOM)?;

        self.open_message(tree::STOP)?;
        wire::write_sint_field(&mut self.out, stop::DX, i64::from(tile.x) - i64::from(enclosing.min_x))?;
        wire::write_sint_field(&mut self.out, stop::DY, i64::from(tile.y) - i64::from(enclosing.min_y))?;
        wire::write_sint_field(&mut self.out, stop::ID, s.id.0)?;
        self.write_names(stop::NAME, stop::NAME_EN, &s.name, s.name_en.as_deref())?;
        let mut dropped = 0;
        for id in route_ids {
            match self.remap.get(id) {
                Some(output) => {
                    wire::write_uint_field(&mut self.out, stop::ROUTE, u64::from(output.0))?;
                }
                None => {
                    log::error!("stop {} references route {} which was never written", s.id, id);
                    dropped += 1;
                }
            }
        }
        self.close_message()?;
        Ok(dropped)
    }

    pub fn end_tree_element(&mut self) -> BinaryResult<()> {
        let WriterState::TreeOpen(depth) = self.state else {
            return Err(self.invalid("end_tree_element"));
        };
        self.close_message()?;
        self.bounds.pop();
        self.state = if depth == 1 { WriterState::TreeClosed } else { WriterState::TreeOpen(depth - 1) };
        Ok(())
    }

    /// Close the tree section without writing any element.
    pub fn skip_tree(&mut self) -> BinaryResult<()> {
        if self.state != WriterState::RoutesClosed {
            return Err(self.invalid("skip_tree"));
        }
        self.state = WriterState::TreeClosed;
        Ok(())
    }

    // ── String table and close ────────────────────────────────────────────

    pub fn write_string_table(&mut self) -> BinaryResult<()> {
        if self.state != WriterState::TreeClosed {
            return Err(self.invalid("write_string_table"));
        }
        self.open_message(index::STRING_TABLE)?;
        for s in self.strings.as_slice() {
            wire::write_string_field(&mut self.out, string_table::STRING, s)?;
        }
        self.close_message()?;
        self.state = WriterState::StringsWritten;
        Ok(())
    }

    /// Close the index, flush, and hand back the output.
    pub fn finish(mut self) -> BinaryResult<W> {
        if self.state != WriterState::StringsWritten {
            return Err(self.invalid("finish"));
        }
        self.close_message()?;
        self.out.flush()?;
        log::debug!("transport index closed: {} strings", self.strings.len());
        Ok(self.out)
    }
}

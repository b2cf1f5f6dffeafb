//! In-memory decoder for a written transport index.
//!
//! Deltas are resolved while decoding: route stops and tree stops carry
//! absolute tile coordinates, tree nodes carry absolute boxes.

use ti_core::{OutputRouteId, StopId, TilePoint, TileRect};

use crate::format::{self, file, index, route, route_stop, routes, stop, string_table, tree};
use crate::wire::{WireReader, WIRE_LEN, WIRE_VARINT};
use crate::{BinaryError, BinaryResult};

// ── Decoded model ─────────────────────────────────────────────────────────────

/// A stop as listed inside a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRouteStop {
    pub id:      StopId,
    pub tile:    TilePoint,
    pub name:    u32,
    pub name_en: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRoute {
    pub id:       i64,
    pub mode:     u32,
    pub operator: Option<u32>,
    pub r#ref:    String,
    pub name:     u32,
    pub name_en:  Option<u32>,
    pub distance: u32,
    pub forward:  Vec<IndexRouteStop>,
    pub backward: Vec<IndexRouteStop>,
}

/// A stop record in the spatial tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStop {
    pub id:      StopId,
    pub tile:    TilePoint,
    pub name:    u32,
    pub name_en: Option<u32>,
    pub routes:  Vec<OutputRouteId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexTreeNode {
    pub rect:     TileRect,
    pub children: Vec<IndexTreeNode>,
    pub stops:    Vec<IndexStop>,
}

impl IndexTreeNode {
    fn collect_in<'a>(&'a self, rect: &TileRect, out: &mut Vec<&'a IndexStop>) {
        if !self.rect.intersects(rect) {
            return;
        }
        out.extend(self.stops.iter().filter(|s| rect.contains_point(s.tile)));
        for child in &self.children {
            child.collect_in(rect, out);
        }
    }

    fn collect_all<'a>(&'a self, out: &mut Vec<&'a IndexStop>) {
        out.extend(&self.stops);
        for child in &self.children {
            child.collect_all(out);
        }
    }
}

/// A fully decoded transport index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportIndex {
    pub version: u64,
    pub name:    String,
    /// Routes in output-id order.
    pub routes:  Vec<IndexRoute>,
    /// Root of the stop tree; `None` when no stops were written.
    pub tree:    Option<IndexTreeNode>,
    pub strings: Vec<String>,
}

impl TransportIndex {
    pub fn string(&self, id: u32) -> Option<&str> {
        self.strings.get(id as usize).map(String::as_str)
    }

    pub fn route(&self, id: OutputRouteId) -> Option<&IndexRoute> {
        self.routes.get(id.index())
    }

    /// Stops whose tile lies in `rect`, visiting only intersecting subtrees.
    pub fn stops_in_rect(&self, rect: &TileRect) -> Vec<&IndexStop> {
        let mut out = Vec::new();
        if let Some(root) = &self.tree {
            root.collect_in(rect, &mut out);
        }
        out
    }

    /// Every stop in tree order.
    pub fn stops(&self) -> Vec<&IndexStop> {
        let mut out = Vec::new();
        if let Some(root) = &self.tree {
            root.collect_all(&mut out);
        }
        out
    }
}

// ── Decoding ──────────────────────────────────────────────────────────────────

fn varint(r: &mut WireReader<'_>, field: u32, wire_type: u8) -> BinaryResult<u64> {
    r.expect(field, wire_type, WIRE_VARINT)?;
    r.read_varint()
}

fn sint(r: &mut WireReader<'_>, field: u32, wire_type: u8) -> BinaryResult<i64> {
    r.expect(field, wire_type, WIRE_VARINT)?;
    r.read_sint()
}

fn sid(r: &mut WireReader<'_>, field: u32, wire_type: u8) -> BinaryResult<u32> {
    let v = varint(r, field, wire_type)?;
    u32::try_from(v).map_err(|_| r.error(format!("string id {v} out of range")))
}

fn string<'a>(r: &mut WireReader<'a>, field: u32, wire_type: u8) -> BinaryResult<&'a str> {
    r.expect(field, wire_type, WIRE_LEN)?;
    r.read_string()
}

fn message<'a>(r: &mut WireReader<'a>, field: u32, wire_type: u8) -> BinaryResult<WireReader<'a>> {
    r.expect(field, wire_type, WIRE_LEN)?;
    r.read_message()
}

fn coord(r: &WireReader<'_>, v: i64) -> BinaryResult<i32> {
    i32::try_from(v).map_err(|_| r.error(format!("coordinate {v} out of range")))
}

fn missing(r: &WireReader<'_>, what: &str) -> BinaryError {
    r.error(format!("missing {what}"))
}

/// Decode a complete index file.
pub fn read_index(bytes: &[u8]) -> BinaryResult<TransportIndex> {
    let mut r = WireReader::new(bytes);
    let mut version = None;
    let mut body = None;
    while !r.is_empty() {
        let (field, wt) = r.read_tag()?;
        match field {
            file::VERSION => version = Some(varint(&mut r, field, wt)?),
            file::TRANSPORT_INDEX => body = Some(message(&mut r, field, wt)?),
            _ => return Err(r.unknown_field("file", field)),
        }
    }
    let version = version.ok_or_else(|| missing(&r, "version"))?;
    if version != format::INDEX_VERSION {
        return Err(r.error(format!("unsupported index version {version}")));
    }
    let body = body.ok_or_else(|| missing(&r, "transport index"))?;
    let mut index = read_transport_index(body)?;
    index.version = version;
    Ok(index)
}

fn read_transport_index(mut r: WireReader<'_>) -> BinaryResult<TransportIndex> {
    let mut out = TransportIndex {
        version: 0,
        name:    String::new(),
        routes:  Vec::new(),
        tree:    None,
        strings: Vec::new(),
    };
    while !r.is_empty() {
        let (field, wt) = r.read_tag()?;
        match field {
            index::NAME => out.name = string(&mut r, field, wt)?.to_owned(),
            index::ROUTES => {
                let mut section = message(&mut r, field, wt)?;
                while !section.is_empty() {
                    let (field, wt) = section.read_tag()?;
                    if field != routes::ROUTE {
                        return Err(section.unknown_field("routes", field));
                    }
                    let body = message(&mut section, field, wt)?;
                    out.routes.push(read_route(body)?);
                }
            }
            index::STOPS_TREE => {
                let body = message(&mut r, field, wt)?;
                out.tree = Some(read_tree(body, &TileRect::new(0, 0, 0, 0))?);
            }
            index::STRING_TABLE => {
                let mut table = message(&mut r, field, wt)?;
                while !table.is_empty() {
                    let (field, wt) = table.read_tag()?;
                    if field != string_table::STRING {
                        return Err(table.unknown_field("string table", field));
                    }
                    out.strings.push(string(&mut table, field, wt)?.to_owned());
                }
            }
            _ => return Err(r.unknown_field("transport index", field)),
        }
    }
    Ok(out)
}

fn read_route(mut r: WireReader<'_>) -> BinaryResult<IndexRoute> {
    let mut out = IndexRoute {
        id:       0,
        mode:     0,
        operator: None,
        r#ref:    String::new(),
        name:     0,
        name_en:  None,
        distance: 0,
        forward:  Vec::new(),
        backward: Vec::new(),
    };
    let mut prev_forward = (0, 0, 0);
    let mut prev_backward = (0, 0, 0);
    while !r.is_empty() {
        let (field, wt) = r.read_tag()?;
        match field {
            route::ID => out.id = varint(&mut r, field, wt)? as i64,
            route::TYPE => out.mode = sid(&mut r, field, wt)?,
            route::OPERATOR => out.operator = Some(sid(&mut r, field, wt)?),
            route::REF => out.r#ref = string(&mut r, field, wt)?.to_owned(),
            route::NAME => out.name = sid(&mut r, field, wt)?,
            route::NAME_EN => out.name_en = Some(sid(&mut r, field, wt)?),
            route::DISTANCE => {
                let d = varint(&mut r, field, wt)?;
                out.distance = u32::try_from(d).map_err(|_| r.error("distance out of range"))?;
            }
            route::FORWARD_STOP => {
                let body = message(&mut r, field, wt)?;
                out.forward.push(read_route_stop(body, &mut prev_forward)?);
            }
            route::BACKWARD_STOP => {
                let body = message(&mut r, field, wt)?;
                out.backward.push(read_route_stop(body, &mut prev_backward)?);
            }
            _ => return Err(r.unknown_field("route", field)),
        }
    }
    Ok(out)
}

/// `prev` is the previous stop's `(id, x, y)` in the same list.
fn read_route_stop(mut r: WireReader<'_>, prev: &mut (i64, i64, i64)) -> BinaryResult<IndexRouteStop> {
    let (mut id, mut x, mut y) = *prev;
    let mut name = None;
    let mut name_en = None;
    while !r.is_empty() {
        let (field, wt) = r.read_tag()?;
        match field {
            route_stop::ID => id = prev.0.wrapping_add(sint(&mut r, field, wt)?),
            route_stop::DX => x = prev.1 + sint(&mut r, field, wt)?,
            route_stop::DY => y = prev.2 + sint(&mut r, field, wt)?,
            route_stop::NAME => name = Some(sid(&mut r, field, wt)?),
            route_stop::NAME_EN => name_en = Some(sid(&mut r, field, wt)?),
            _ => return Err(r.unknown_field("route stop", field)),
        }
    }
    *prev = (id, x, y);
    Ok(IndexRouteStop {
        id:   StopId(id),
        tile: TilePoint::new(coord(&r, x)?, coord(&r, y)?),
        name: name.ok_or_else(|| missing(&r, "route stop name"))?,
        name_en,
    })
}

fn read_tree(mut r: WireReader<'_>, parent: &TileRect) -> BinaryResult<IndexTreeNode> {
    let (mut left, mut right, mut top, mut bottom) = (0i64, 0i64, 0i64, 0i64);
    let mut subtrees = Vec::new();
    let mut stops = Vec::new();
    while !r.is_empty() {
        let (field, wt) = r.read_tag()?;
        match field {
            tree::LEFT => left = sint(&mut r, field, wt)?,
            tree::RIGHT => right = sint(&mut r, field, wt)?,
            tree::TOP => top = sint(&mut r, field, wt)?,
            tree::BOTTOM => bottom = sint(&mut r, field, wt)?,
            tree::SUBTREE => subtrees.push(message(&mut r, field, wt)?),
            tree::STOP => stops.push(message(&mut r, field, wt)?),
            _ => return Err(r.unknown_field("stops tree", field)),
        }
    }
    let rect = TileRect::new(
        coord(&r, i64::from(parent.min_x) + left)?,
        coord(&r, i64::from(parent.min_y) + top)?,
        coord(&r, i64::from(parent.max_x) + right)?,
        coord(&r, i64::from(parent.max_y) + bottom)?,
    );
    Ok(IndexTreeNode {
        children: subtrees
            .into_iter()
            .map(|body| read_tree(body, &rect))
            .collect::<BinaryResult<_>>()?,
        stops: stops
            .into_iter()
            .map(|body| read_stop(body, &rect))
            .collect::<BinaryResult<_>>()?,
        rect,
    })
}

fn read_stop(mut r: WireReader<'_>, enclosing: &TileRect) -> BinaryResult<IndexStop> {
    let (mut dx, mut dy) = (0i64, 0i64);
    let mut id = None;
    let mut name = None;
    let mut name_en = None;
    let mut routes = Vec::new();
    while !r.is_empty() {
        let (field, wt) = r.read_tag()?;
        match field {
            stop::DX => dx = sint(&mut r, field, wt)?,
            stop::DY => dy = sint(&mut r, field, wt)?,
            stop::ID => id = Some(sint(&mut r, field, wt)?),
            stop::NAME => name = Some(sid(&mut r, field, wt)?),
            stop::NAME_EN => name_en = Some(sid(&mut r, field, wt)?),
            stop::ROUTE => {
                let v = varint(&mut r, field, wt)?;
                let id = u32::try_from(v).map_err(|_| r.error(format!("route id {v} out of range")))?;
                routes.push(OutputRouteId(id));
            }
            _ => return Err(r.unknown_field("stop", field)),
        }
    }
    Ok(IndexStop {
        id:   StopId(id.ok_or_else(|| missing(&r, "stop id"))?),
        tile: TilePoint::new(
            coord(&r, i64::from(enclosing.min_x) + dx)?,
            coord(&r, i64::from(enclosing.min_y) + dy)?,
        ),
        name: name.ok_or_else(|| missing(&r, "stop name"))?,
        name_en,
        routes,
    })
}

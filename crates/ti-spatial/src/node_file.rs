//! On-disk node file for the stop R-tree.
//!
//! # Layout
//!
//! ```text
//! header (32 bytes)
//!   magic       [u8; 4] = "TIRT"
//!   version     u32
//!   root offset u64
//!   height      u32      levels of nodes; an empty tree has height 1
//!   leaf count  u64
//!   reserved    u32
//! nodes, post-order (children before their parent)
//!   count       u16
//!   element × count (25 bytes each)
//!     kind      u8       0 = leaf, 1 = node
//!     min_x, min_y, max_x, max_y   i32
//!     ptr       i64      stop id (leaf) or node offset (node)
//! ```
//!
//! All integers are little-endian.  The root is written last, so every child
//! offset a node refers to is smaller than the node's own offset.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use rstar::{ParentNode, RTree, RTreeNode, AABB};

use ti_core::{StopId, TileRect};

use crate::builder::StopEntry;
use crate::{SpatialError, SpatialResult};

pub const MAGIC: [u8; 4] = *b"TIRT";
pub const FORMAT_VERSION: u32 = 1;
pub const HEADER_LEN: usize = 32;
pub const ELEMENT_LEN: usize = 25;

const KIND_LEAF: u8 = 0;
const KIND_NODE: u8 = 1;

// ── Header ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeHeader {
    pub root_offset: u64,
    pub height:      u32,
    pub leaf_count:  u64,
}

impl TreeHeader {
    fn encode(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        buf[0..4].copy_from_slice(&MAGIC);
        buf[4..8].copy_from_slice(&FORMAT_VERSION.to_le_bytes());
        buf[8..16].copy_from_slice(&self.root_offset.to_le_bytes());
        buf[16..20].copy_from_slice(&self.height.to_le_bytes());
        buf[20..28].copy_from_slice(&self.leaf_count.to_le_bytes());
        buf
    }

    fn decode(buf: &[u8; HEADER_LEN]) -> SpatialResult<Self> {
        if buf[0..4] != MAGIC {
            return Err(SpatialError::CorruptTree("bad magic".into()));
        }
        let version = u32::from_le_bytes(le(&buf[4..8]));
        if version != FORMAT_VERSION {
            return Err(SpatialError::CorruptTree(format!("unsupported version {version}")));
        }
        Ok(Self {
            root_offset: u64::from_le_bytes(le(&buf[8..16])),
            height:      u32::from_le_bytes(le(&buf[16..20])),
            leaf_count:  u64::from_le_bytes(le(&buf[20..28])),
        })
    }
}

/// Copy a fixed-width slice into an array.  Callers pass exact ranges.
fn le<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    out
}

// ── Elements and nodes ────────────────────────────────────────────────────────

/// One entry of a tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element {
    /// A stop at a point rect.
    Leaf { rect: TileRect, stop: StopId },
    /// A child node, located at byte `child` of the node file.
    Node { rect: TileRect, child: u64 },
}

impl Element {
    pub fn rect(&self) -> &TileRect {
        match self {
            Element::Leaf { rect, .. } | Element::Node { rect, .. } => rect,
        }
    }

    fn encode(&self) -> [u8; ELEMENT_LEN] {
        let (kind, rect, ptr) = match *self {
            Element::Leaf { rect, stop } => (KIND_LEAF, rect, stop.0),
            Element::Node { rect, child } => (KIND_NODE, rect, child as i64),
        };
        let mut buf = [0u8; ELEMENT_LEN];
        buf[0] = kind;
        buf[1..5].copy_from_slice(&rect.min_x.to_le_bytes());
        buf[5..9].copy_from_slice(&rect.min_y.to_le_bytes());
        buf[9..13].copy_from_slice(&rect.max_x.to_le_bytes());
        buf[13..17].copy_from_slice(&rect.max_y.to_le_bytes());
        buf[17..25].copy_from_slice(&ptr.to_le_bytes());
        buf
    }

    fn decode(buf: &[u8]) -> SpatialResult<Self> {
        let rect = TileRect::new(
            i32::from_le_bytes(le(&buf[1..5])),
            i32::from_le_bytes(le(&buf[5..9])),
            i32::from_le_bytes(le(&buf[9..13])),
            i32::from_le_bytes(le(&buf[13..17])),
        );
        if !rect.is_well_formed() {
            return Err(SpatialError::CorruptTree(format!("inverted rect {rect:?}")));
        }
        let ptr = i64::from_le_bytes(le(&buf[17..25]));
        match buf[0] {
            KIND_LEAF => Ok(Element::Leaf { rect, stop: StopId(ptr) }),
            KIND_NODE if ptr >= HEADER_LEN as i64 => Ok(Element::Node { rect, child: ptr as u64 }),
            KIND_NODE => Err(SpatialError::CorruptTree(format!("child offset {ptr} inside header"))),
            kind => Err(SpatialError::CorruptTree(format!("unknown element kind {kind}"))),
        }
    }
}

/// A node read back from the node file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub offset:   u64,
    pub elements: Vec<Element>,
}

impl TreeNode {
    /// Union of the element rects; `None` for an empty node.
    pub fn bounds(&self) -> Option<TileRect> {
        TileRect::covering(self.elements.iter().map(Element::rect))
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

// ── Writing ───────────────────────────────────────────────────────────────────

fn rect_of(envelope: &AABB<[i64; 2]>) -> TileRect {
    let (lo, hi) = (envelope.lower(), envelope.upper());
    TileRect::new(lo[0] as i32, lo[1] as i32, hi[0] as i32, hi[1] as i32)
}

/// Write `tree` to `file` and return the header that was written.
pub(crate) fn write_tree(file: File, tree: &RTree<StopEntry>) -> SpatialResult<TreeHeader> {
    let mut out = BufWriter::new(file);
    out.write_all(&[0u8; HEADER_LEN])?;
    let mut pos = HEADER_LEN as u64;
    let (root_offset, height) = write_node(&mut out, tree.root(), &mut pos)?;

    let header = TreeHeader { root_offset, height, leaf_count: tree.size() as u64 };
    out.seek(SeekFrom::Start(0))?;
    out.write_all(&header.encode())?;
    out.flush()?;
    Ok(header)
}

/// Post-order write of `node`; returns its offset and height.
fn write_node<W: Write>(
    out:  &mut W,
    node: &ParentNode<StopEntry>,
    pos:  &mut u64,
) -> SpatialResult<(u64, u32)> {
    let mut elements = Vec::with_capacity(node.children().len());
    let mut child_height = 0;
    for child in node.children() {
        match child {
            RTreeNode::Leaf(entry) => {
                elements.push(Element::Leaf { rect: entry.rect(), stop: entry.stop });
            }
            RTreeNode::Parent(parent) => {
                let (offset, height) = write_node(out, parent, pos)?;
                child_height = child_height.max(height);
                elements.push(Element::Node { rect: rect_of(&parent.envelope()), child: offset });
            }
        }
    }

    let count = u16::try_from(elements.len())
        .map_err(|_| SpatialError::CorruptTree(format!("node with {} elements", elements.len())))?;
    let offset = *pos;
    out.write_all(&count.to_le_bytes())?;
    for element in &elements {
        out.write_all(&element.encode())?;
    }
    *pos += 2 + (elements.len() * ELEMENT_LEN) as u64;
    Ok((offset, child_height + 1))
}

// ── Reading ───────────────────────────────────────────────────────────────────

/// Read-only handle on a flushed node file.
pub struct StopTree {
    reader: BufReader<File>,
    header: TreeHeader,
}

impl StopTree {
    pub fn open(path: &Path) -> SpatialResult<Self> {
        let mut reader = BufReader::new(File::open(path)?);
        let mut buf = [0u8; HEADER_LEN];
        reader.read_exact(&mut buf)?;
        let header = TreeHeader::decode(&buf)?;
        Ok(Self { reader, header })
    }

    pub fn header(&self) -> TreeHeader {
        self.header
    }

    pub fn leaf_count(&self) -> u64 {
        self.header.leaf_count
    }

    pub fn root(&mut self) -> SpatialResult<TreeNode> {
        self.read_node(self.header.root_offset)
    }

    /// Read the node at byte offset `ptr`.
    pub fn read_node(&mut self, ptr: u64) -> SpatialResult<TreeNode> {
        if ptr < HEADER_LEN as u64 {
            return Err(SpatialError::CorruptTree(format!("node offset {ptr} inside header")));
        }
        self.reader.seek(SeekFrom::Start(ptr))?;
        let mut count = [0u8; 2];
        self.reader.read_exact(&mut count)?;
        let count = u16::from_le_bytes(count) as usize;

        let mut body = vec![0u8; count * ELEMENT_LEN];
        self.reader.read_exact(&mut body)?;
        let elements = body
            .chunks_exact(ELEMENT_LEN)
            .map(Element::decode)
            .collect::<SpatialResult<Vec<_>>>()?;
        Ok(TreeNode { offset: ptr, elements })
    }

    /// Every leaf of the tree.
    pub fn leaves(&mut self) -> SpatialResult<Vec<(TileRect, StopId)>> {
        let mut out = Vec::with_capacity(self.header.leaf_count as usize);
        let mut stack = vec![self.header.root_offset];
        while let Some(ptr) = stack.pop() {
            let node = self.read_node(ptr)?;
            for element in &node.elements {
                match *element {
                    Element::Leaf { rect, stop } => out.push((rect, stop)),
                    Element::Node { child, .. } => stack.push(child),
                }
            }
        }
        Ok(out)
    }
}

//! OSM PBF relation loader, enabled with the `osm` Cargo feature.
//!
//! # Usage
//!
//! ```ignore
//! use std::path::Path;
//! use ti_extract::osm::load_route_relations;
//!
//! let relations = load_route_relations(Path::new("region.osm.pbf"))?;
//! ```
//!
//! # What is loaded
//!
//! Only relations whose `route` tag names an accepted transit mode and that
//! carry a `ref` are kept.  Their node members and way members are resolved
//! to positions; everything else in the file is skipped.
//!
//! # Passes
//!
//! PBF files store nodes before ways before relations, so the file is read
//! three times: relations first (to learn which elements are needed), then
//! ways (to learn their node refs), then nodes.  Only referenced nodes are
//! buffered.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use osmpbf::{Element, ElementReader, RelMemberType};

use ti_core::{GeoPoint, TransportMode};

use crate::relation::{MemberElement, OsmNode, OsmWay, Relation, RelationMember, Tags};
use crate::{ExtractError, ExtractResult};

// ── Public entry point ────────────────────────────────────────────────────────

/// Load every transit route relation in `path` with members resolved.
///
/// # Errors
///
/// [`ExtractError::Io`] when `path` cannot be opened, [`ExtractError::Osm`]
/// on parse errors.
pub fn load_route_relations(path: &Path) -> ExtractResult<Vec<Relation>> {
    // ── Pass 1: route relations and the element ids they reference ────────
    let mut pending: Vec<PendingRelation> = Vec::new();
    let mut wanted_nodes: HashSet<i64> = HashSet::new();
    let mut wanted_ways: HashSet<i64> = HashSet::new();

    open(path)?
        .for_each(|elem| {
            let Element::Relation(rel) = elem else { return };
            let tags: Tags = rel
                .tags()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect();
            if !is_transit_route(&tags) {
                return;
            }
            let members: Vec<PendingMember> = rel
                .members()
                .map(|m| {
                    match m.member_type {
                        RelMemberType::Node => { wanted_nodes.insert(m.member_id); }
                        RelMemberType::Way  => { wanted_ways.insert(m.member_id); }
                        RelMemberType::Relation => {}
                    }
                    PendingMember {
                        role: m.role().unwrap_or_default().to_owned(),
                        kind: m.member_type,
                        id:   m.member_id,
                    }
                })
                .collect();
            pending.push(PendingRelation { id: rel.id(), tags, members });
        })
        .map_err(|e| ExtractError::Osm(e.to_string()))?;

    log::info!(
        "route relations: {}, member nodes: {}, member ways: {}",
        pending.len(),
        wanted_nodes.len(),
        wanted_ways.len()
    );

    // ── Pass 2: node refs of member ways ──────────────────────────────────
    let mut way_refs: HashMap<i64, Vec<i64>> = HashMap::with_capacity(wanted_ways.len());
    open(path)?
        .for_each(|elem| {
            if let Element::Way(w) = elem {
                if wanted_ways.contains(&w.id()) {
                    way_refs.insert(w.id(), w.refs().collect());
                }
            }
        })
        .map_err(|e| ExtractError::Osm(e.to_string()))?;
    drop(wanted_ways);

    let mut geometry_nodes: HashSet<i64> = way_refs.values().flatten().copied().collect();
    geometry_nodes.extend(wanted_nodes.iter().copied());

    // ── Pass 3: positions (and tags for stop candidates) ──────────────────
    let mut nodes: HashMap<i64, OsmNode> = HashMap::with_capacity(geometry_nodes.len());
    open(path)?
        .for_each(|elem| match elem {
            Element::Node(n) if geometry_nodes.contains(&n.id()) => {
                let mut node = OsmNode::new(n.id(), GeoPoint::new(n.lat(), n.lon()));
                if wanted_nodes.contains(&n.id()) {
                    node.tags = n.tags().map(|(k, v)| (k.to_owned(), v.to_owned())).collect();
                }
                nodes.insert(n.id(), node);
            }
            Element::DenseNode(n) if geometry_nodes.contains(&n.id()) => {
                let mut node = OsmNode::new(n.id(), GeoPoint::new(n.lat(), n.lon()));
                if wanted_nodes.contains(&n.id()) {
                    node.tags = n.tags().map(|(k, v)| (k.to_owned(), v.to_owned())).collect();
                }
                nodes.insert(n.id(), node);
            }
            _ => {}
        })
        .map_err(|e| ExtractError::Osm(e.to_string()))?;

    // ── Resolve members ───────────────────────────────────────────────────
    let relations = pending
        .into_iter()
        .map(|p| Relation {
            id:      p.id,
            tags:    p.tags,
            members: p
                .members
                .into_iter()
                .map(|m| RelationMember {
                    element: resolve(&m, &nodes, &way_refs),
                    role:    m.role,
                })
                .collect(),
        })
        .collect();

    Ok(relations)
}

// ── Internal types ────────────────────────────────────────────────────────────

struct PendingRelation {
    id:      i64,
    tags:    Tags,
    members: Vec<PendingMember>,
}

struct PendingMember {
    role: String,
    kind: RelMemberType,
    id:   i64,
}

fn open(path: &Path) -> ExtractResult<ElementReader<BufReader<File>>> {
    let file = File::open(path)?;
    Ok(ElementReader::new(BufReader::new(file)))
}

/// Cheap pre-filter matching the extractor's acceptance rule, so unrelated
/// relations never get buffered.
fn is_transit_route(tags: &Tags) -> bool {
    tags.contains_key("ref")
        && tags
            .get("route")
            .is_some_and(|r| TransportMode::from_tag(r).is_some())
}

fn resolve(
    m: &PendingMember,
    nodes: &HashMap<i64, OsmNode>,
    way_refs: &HashMap<i64, Vec<i64>>,
) -> MemberElement {
    match m.kind {
        RelMemberType::Node => match nodes.get(&m.id) {
            Some(node) => MemberElement::Node(node.clone()),
            None       => MemberElement::Other(m.id),
        },
        RelMemberType::Way => match way_refs.get(&m.id) {
            Some(refs) => MemberElement::Way(OsmWay {
                id:     m.id,
                points: refs
                    .iter()
                    .filter_map(|r| nodes.get(r).map(|n| n.location))
                    .collect(),
            }),
            None => MemberElement::Other(m.id),
        },
        RelMemberType::Relation => MemberElement::Other(m.id),
    }
}

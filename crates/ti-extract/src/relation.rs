//! Tagged relation structures handed to the extractor.
//!
//! These mirror the parts of an OSM relation the extractor needs: the
//! relation's own tags plus its members, each carrying a role string and the
//! resolved member element.  Loaders (the PBF reader behind the `osm`
//! feature, or tests) build them; the extractor only reads them.

use std::collections::HashMap;

use ti_core::GeoPoint;

/// Tag storage type.
pub type Tags = HashMap<String, String>;

/// A point element with its position and tags.
#[derive(Clone, Debug, PartialEq)]
pub struct OsmNode {
    pub id:       i64,
    pub location: GeoPoint,
    pub tags:     Tags,
}

impl OsmNode {
    pub fn new(id: i64, location: GeoPoint) -> Self {
        Self { id, location, tags: Tags::new() }
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn with_tag(mut self, key: &str, value: &str) -> Self {
        self.tags.insert(key.to_owned(), value.to_owned());
        self
    }
}

/// A way element with its node positions resolved (missing nodes dropped).
#[derive(Clone, Debug, PartialEq)]
pub struct OsmWay {
    pub id:     i64,
    pub points: Vec<GeoPoint>,
}

/// The element a relation member points at.
#[derive(Clone, Debug, PartialEq)]
pub enum MemberElement {
    Node(OsmNode),
    Way(OsmWay),
    /// Nested relation, or a member whose element is not available.
    Other(i64),
}

#[derive(Clone, Debug, PartialEq)]
pub struct RelationMember {
    pub role:    String,
    pub element: MemberElement,
}

/// A relation with tags and ordered members.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Relation {
    pub id:      i64,
    pub tags:    Tags,
    pub members: Vec<RelationMember>,
}

impl Relation {
    pub fn new(id: i64) -> Self {
        Self { id, tags: Tags::new(), members: Vec::new() }
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn with_tag(mut self, key: &str, value: &str) -> Self {
        self.tags.insert(key.to_owned(), value.to_owned());
        self
    }

    pub fn with_member(mut self, role: &str, element: MemberElement) -> Self {
        self.members.push(RelationMember { role: role.to_owned(), element });
        self
    }
}

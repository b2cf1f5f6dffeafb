//! Transport routes and stops as produced by extraction and consumed by the
//! staging and indexing phases.

use crate::{GeoPoint, RouteId, StopId, TransportMode};

/// Direction of travel along a route.  Stored as `1` (forward) / `0`
/// (backward) in the staging store.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    #[inline]
    pub fn as_flag(self) -> i64 {
        match self {
            Direction::Forward  => 1,
            Direction::Backward => 0,
        }
    }

    #[inline]
    pub fn from_flag(flag: i64) -> Direction {
        if flag != 0 { Direction::Forward } else { Direction::Backward }
    }
}

/// A stop position.  The same stop may appear on many routes; it is keyed
/// globally by `id`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransportStop {
    pub id:       StopId,
    pub location: GeoPoint,
    pub name:     String,
    pub name_en:  Option<String>,
}

impl TransportStop {
    pub fn new(id: StopId, location: GeoPoint, name: impl Into<String>) -> Self {
        Self { id, location, name: name.into(), name_en: None }
    }

    pub fn with_name_en(mut self, name_en: impl Into<String>) -> Self {
        self.name_en = Some(name_en.into());
        self
    }
}

/// A way member of a route relation, kept for route geometry.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteWay {
    pub id:     i64,
    pub points: Vec<GeoPoint>,
}

/// One transit route with its stops ordered per direction.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransportRoute {
    pub id:       RouteId,
    pub mode:     TransportMode,
    pub operator: Option<String>,
    pub r#ref:    String,
    pub name:     String,
    pub name_en:  Option<String>,
    pub forward:  Vec<TransportStop>,
    pub backward: Vec<TransportStop>,
    pub ways:     Vec<RouteWay>,
}

impl TransportRoute {
    pub fn new(id: RouteId, mode: TransportMode, r#ref: impl Into<String>) -> Self {
        Self {
            id,
            mode,
            operator: None,
            r#ref:    r#ref.into(),
            name:     String::new(),
            name_en:  None,
            forward:  Vec::new(),
            backward: Vec::new(),
            ways:     Vec::new(),
        }
    }

    /// Stops of one direction.
    pub fn stops(&self, direction: Direction) -> &[TransportStop] {
        match direction {
            Direction::Forward  => &self.forward,
            Direction::Backward => &self.backward,
        }
    }

    /// Average path length in metres over the directions that have stops.
    ///
    /// Each direction's length is the sum of great-circle distances between
    /// consecutive stops.  A route with stops in one direction only reports
    /// that direction's length.
    pub fn avg_both_distance(&self) -> u32 {
        let lengths: Vec<f64> = [&self.forward, &self.backward]
            .into_iter()
            .filter(|stops| !stops.is_empty())
            .map(|stops| path_length_m(stops))
            .collect();
        if lengths.is_empty() {
            return 0;
        }
        let avg = lengths.iter().sum::<f64>() / lengths.len() as f64;
        avg.round().min(u32::MAX as f64) as u32
    }
}

fn path_length_m(stops: &[TransportStop]) -> f64 {
    stops
        .windows(2)
        .map(|w| w[0].location.distance_m(w[1].location))
        .sum()
}

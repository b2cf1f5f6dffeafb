//! Plain data row types stored in the staging tables.

use ti_core::{Direction, GeoPoint, RouteId, StopId, TransportRoute, TransportStop};

/// One `transport_route` row.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRow {
    pub id:       RouteId,
    /// Mode tag value (`bus`, `tram`, …).
    pub mode:     String,
    pub operator: Option<String>,
    pub r#ref:    String,
    pub name:     String,
    pub name_en:  Option<String>,
    /// Average bidirectional stop distance in metres.
    pub distance: u32,
}

impl From<&TransportRoute> for RouteRow {
    fn from(r: &TransportRoute) -> Self {
        Self {
            id:       r.id,
            mode:     r.mode.as_str().to_owned(),
            operator: r.operator.clone(),
            r#ref:    r.r#ref.clone(),
            name:     r.name.clone(),
            name_en:  r.name_en.clone(),
            distance: r.avg_both_distance(),
        }
    }
}

/// One `transport_stop` row.
#[derive(Debug, Clone, PartialEq)]
pub struct StopRow {
    pub id:        StopId,
    pub latitude:  f64,
    pub longitude: f64,
    pub name:      String,
    pub name_en:   Option<String>,
}

impl StopRow {
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

impl From<&TransportStop> for StopRow {
    fn from(s: &TransportStop) -> Self {
        Self {
            id:        s.id,
            latitude:  s.location.lat,
            longitude: s.location.lon,
            name:      s.name.clone(),
            name_en:   s.name_en.clone(),
        }
    }
}

impl From<StopRow> for TransportStop {
    fn from(row: StopRow) -> Self {
        TransportStop {
            id:       row.id,
            location: row.location(),
            name:     row.name,
            name_en:  row.name_en,
        }
    }
}

/// One `transport_route_stop` row: the stop at position `ordinal` of the
/// route's `direction` sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteStopRow {
    pub route:     RouteId,
    pub stop:      StopId,
    pub direction: Direction,
    pub ordinal:   u32,
}

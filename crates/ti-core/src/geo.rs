//! Geographic coordinates and the tile projection used as the spatial key.
//!
//! Stops are stored with double-precision latitude/longitude but indexed by
//! their Web-Mercator tile number at [`STOP_ZOOM`].  At zoom 24 a tile is
//! roughly 2.4 m wide at the equator, so the integer coordinate is a lossless
//! enough key for stop positions while staying well inside `i32`.

use std::f64::consts::PI;

use crate::{CoreError, CoreResult};

/// Zoom level at which stop coordinates are quantized.  Shared by the
/// spatial-index insertion phase and the binary write-back phase.
pub const STOP_ZOOM: u8 = 24;

/// Latitude bound of the Web-Mercator projection.
pub const MAX_LATITUDE: f64 = 85.0511;

/// A WGS-84 geographic coordinate.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// `true` when both components are finite and inside the WGS-84 range.
    pub fn is_valid(self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Haversine great-circle distance in metres.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        const R: f64 = 6_371_000.0; // mean Earth radius, metres

        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        R * c
    }

    /// Project onto the integer tile grid at `zoom`.
    ///
    /// Latitude is clamped to the Mercator range; the fractional tile
    /// position is truncated.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidCoordinate`] for non-finite or out-of-range input.
    pub fn to_tile(self, zoom: u8) -> CoreResult<TilePoint> {
        if !self.is_valid() {
            return Err(CoreError::InvalidCoordinate { lat: self.lat, lon: self.lon });
        }
        Ok(TilePoint { x: tile_x(zoom, self.lon), y: tile_y(zoom, self.lat) })
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

#[inline]
fn tiles_at(zoom: u8) -> f64 {
    (1u64 << zoom) as f64
}

fn tile_x(zoom: u8, lon: f64) -> i32 {
    let n = tiles_at(zoom);
    if lon >= 180.0 {
        return (n - 1.0) as i32;
    }
    ((lon + 180.0) / 360.0 * n) as i32
}

fn tile_y(zoom: u8, lat: f64) -> i32 {
    let n = tiles_at(zoom);
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let merc = (lat.tan() + 1.0 / lat.cos()).ln();
    let y = (1.0 - merc / PI) / 2.0 * n;
    y.clamp(0.0, n - 1.0) as i32
}

// ── Tile geometry ─────────────────────────────────────────────────────────────

/// An integer tile coordinate at some zoom level (always [`STOP_ZOOM`] for
/// stops).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TilePoint {
    pub x: i32,
    pub y: i32,
}

impl TilePoint {
    #[inline]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// De-quantize to the geographic position of the tile's north-west
    /// corner.  The original coordinate lies within one tile of the result.
    pub fn to_geo(self, zoom: u8) -> GeoPoint {
        let n = tiles_at(zoom);
        let lon = self.x as f64 / n * 360.0 - 180.0;
        let lat = (PI * (1.0 - 2.0 * self.y as f64 / n)).sinh().atan().to_degrees();
        GeoPoint { lat, lon }
    }
}

/// Axis-aligned integer rectangle on the tile grid.  Points are degenerate
/// rectangles with `min == max`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileRect {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl TileRect {
    #[inline]
    pub fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    #[inline]
    pub fn point(p: TilePoint) -> Self {
        Self { min_x: p.x, min_y: p.y, max_x: p.x, max_y: p.y }
    }

    /// `min <= max` on both axes.
    pub fn is_well_formed(&self) -> bool {
        self.min_x <= self.max_x && self.min_y <= self.max_y
    }

    pub fn expand_to_include(&mut self, other: &TileRect) {
        self.min_x = self.min_x.min(other.min_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_x = self.max_x.max(other.max_x);
        self.max_y = self.max_y.max(other.max_y);
    }

    pub fn union(mut self, other: &TileRect) -> TileRect {
        self.expand_to_include(other);
        self
    }

    /// Minimal rectangle covering every rect in `rects`; `None` when empty.
    pub fn covering<'a>(rects: impl IntoIterator<Item = &'a TileRect>) -> Option<TileRect> {
        rects.into_iter().fold(None, |acc, r| match acc {
            None => Some(*r),
            Some(a) => Some(a.union(r)),
        })
    }

    pub fn intersects(&self, other: &TileRect) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    pub fn contains_point(&self, p: TilePoint) -> bool {
        (self.min_x..=self.max_x).contains(&p.x) && (self.min_y..=self.max_y).contains(&p.y)
    }
}

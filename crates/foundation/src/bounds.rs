use serde::{Deserialize, Serialize};

use crate::math::GeoPoint;

/// Axis-aligned geographic bound in decimal degrees.
///
/// `south <= north` always holds. `west > east` describes an interval that
/// wraps across the antimeridian, e.g. `(170, -10, -170, 10)` is 20° wide.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoBound {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl GeoBound {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        let (south, north) = if south <= north {
            (south, north)
        } else {
            (north, south)
        };
        GeoBound {
            west,
            south,
            east,
            north,
        }
    }

    pub fn world() -> Self {
        Self::new(-180.0, -90.0, 180.0, 90.0)
    }

    /// Smallest bound containing every point.
    ///
    /// Longitudes are assumed to lie in `[-180, 180]`. When the points straddle
    /// the antimeridian and the wrapped interval is narrower than the direct
    /// one, the wrapped representation is returned.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a GeoPoint>) -> Option<Self> {
        let mut south = f64::INFINITY;
        let mut north = f64::NEG_INFINITY;
        let mut lons: Vec<f64> = Vec::new();
        for p in points {
            south = south.min(p.lat);
            north = north.max(p.lat);
            lons.push(p.lon);
        }
        if lons.is_empty() {
            return None;
        }

        lons.sort_by(|a, b| a.total_cmp(b));
        let west = lons[0];
        let east = lons[lons.len() - 1];

        // The widest gap between consecutive longitudes (including the gap
        // through the antimeridian) is the part of the circle not covered.
        let mut gap = 360.0 - (east - west);
        let mut wrapped: Option<(f64, f64)> = None;
        for pair in lons.windows(2) {
            let g = pair[1] - pair[0];
            if g > gap {
                gap = g;
                wrapped = Some((pair[1], pair[0]));
            }
        }

        Some(match wrapped {
            Some((w, e)) => Self::new(w, south, e, north),
            None => Self::new(west, south, east, north),
        })
    }

    pub fn wraps(&self) -> bool {
        self.west > self.east
    }

    /// Longitudinal extent in degrees, accounting for wraparound.
    pub fn width(&self) -> f64 {
        if self.wraps() {
            self.east + 360.0 - self.west
        } else {
            self.east - self.west
        }
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    pub fn center(&self) -> GeoPoint {
        let mut lon = self.west + self.width() * 0.5;
        if lon > 180.0 {
            lon -= 360.0;
        }
        GeoPoint::new(lon, (self.south + self.north) * 0.5)
    }

    pub fn contains_lon(&self, lon: f64) -> bool {
        if self.wraps() {
            lon >= self.west || lon <= self.east
        } else {
            lon >= self.west && lon <= self.east
        }
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lat >= self.south && lat <= self.north && self.contains_lon(lon)
    }

    /// Closed-interval intersection test (touching edges count).
    pub fn intersects(&self, other: &GeoBound) -> bool {
        if self.south > other.north || other.south > self.north {
            return false;
        }
        lon_intervals(self)
            .iter()
            .any(|a| lon_intervals(other).iter().any(|b| a.0 <= b.1 && b.0 <= a.1))
    }

    /// Smallest bound containing both, merged on the longitude circle.
    pub fn union(&self, other: &GeoBound) -> GeoBound {
        let south = self.south.min(other.south);
        let north = self.north.max(other.north);

        let (wa, wb) = (self.width(), other.width());
        let from_self = wa.max((other.west - self.west).rem_euclid(360.0) + wb);
        let from_other = wb.max((self.west - other.west).rem_euclid(360.0) + wa);
        let (west, len) = if from_self <= from_other {
            (self.west, from_self)
        } else {
            (other.west, from_other)
        };
        if len >= 360.0 {
            return GeoBound::new(-180.0, south, 180.0, north);
        }

        let mut east = west + len;
        if east > 180.0 {
            east -= 360.0;
        }
        GeoBound::new(west, south, east, north)
    }
}

fn lon_intervals(b: &GeoBound) -> Vec<(f64, f64)> {
    if b.wraps() {
        vec![(b.west, 180.0), (-180.0, b.east)]
    } else {
        vec![(b.west, b.east)]
    }
}

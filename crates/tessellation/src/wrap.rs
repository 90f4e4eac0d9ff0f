//! Seam handling for flat, longitude-wrapping projections.
//!
//! Instead of cutting a ring at ±180°, a ring is drawn continuously past the
//! seam and offered as two copies one world-width apart; the viewer draws
//! whichever faces the camera.

use foundation::math::GeoPoint;

/// True when an edge is shorter going through the seam than across the map.
pub fn is_discontinuous(ring: &[GeoPoint]) -> bool {
    let n = ring.len();
    (0..n).any(|i| {
        let d = (ring[(i + 1) % n].lon - ring[i].lon).abs();
        360.0 - d < d
    })
}

/// Rewrite longitudes so each step takes the short way round.
pub fn unwrap_ring(points: &[GeoPoint]) -> Vec<GeoPoint> {
    let Some(&first) = points.first() else {
        return Vec::new();
    };
    let mut out = Vec::with_capacity(points.len());
    let mut prev_lon = first.lon;
    out.push(first);
    for p in &points[1..] {
        let lon = prev_lon + ((p.lon - prev_lon + 180.0).rem_euclid(360.0) - 180.0);
        prev_lon = lon;
        out.push(GeoPoint::with_alt(lon, p.lat, p.alt));
    }
    out
}

fn shifted(points: &[GeoPoint], by: f64) -> Vec<GeoPoint> {
    points
        .iter()
        .map(|p| GeoPoint::with_alt(p.lon + by, p.lat, p.alt))
        .collect()
}

/// East and west copies of a ring, 360° apart.
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedRing {
    pub east: Vec<GeoPoint>,
    pub west: Vec<GeoPoint>,
}

impl WrappedRing {
    /// The east copy reaches past +180°, the west copy past -180°. A ring
    /// that does not touch the seam stays where it is in the copy on its
    /// own side.
    pub fn new(ring: &[GeoPoint]) -> Self {
        let unwrapped = unwrap_ring(ring);
        let (min, max) = unwrapped
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.lon), hi.max(p.lon))
            });
        let on_east_side = if max > 180.0 {
            true
        } else if min < -180.0 {
            false
        } else {
            min + max >= 0.0
        };
        if on_east_side {
            Self {
                west: shifted(&unwrapped, -360.0),
                east: unwrapped,
            }
        } else {
            Self {
                east: shifted(&unwrapped, 360.0),
                west: unwrapped,
            }
        }
    }

    /// Exactly one copy: east when looking at the eastern hemisphere.
    pub fn visible_copy(&self, view_center_lon: f64) -> &[GeoPoint] {
        if view_center_lon >= 0.0 {
            &self.east
        } else {
            &self.west
        }
    }
}

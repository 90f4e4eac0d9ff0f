//! Axis-aligned clipping of rings and polylines.
//!
//! Works in any planar coordinate pair: lon/lat degrees for CRS bounds,
//! grid units for tiles.

use foundation::bounds::GeoBound;
use foundation::math::{GeoPoint, Vec2};

/// A vertex that can be clipped: planar coordinates plus interpolation.
pub trait ClipPoint: Copy {
    fn xy(&self) -> (f64, f64);
    fn set_xy(&mut self, x: f64, y: f64);
    fn lerp(a: Self, b: Self, t: f64) -> Self;
}

impl ClipPoint for GeoPoint {
    fn xy(&self) -> (f64, f64) {
        (self.lon, self.lat)
    }

    fn set_xy(&mut self, x: f64, y: f64) {
        self.lon = x;
        self.lat = y;
    }

    fn lerp(a: Self, b: Self, t: f64) -> Self {
        GeoPoint::with_alt(
            a.lon + (b.lon - a.lon) * t,
            a.lat + (b.lat - a.lat) * t,
            a.alt + (b.alt - a.alt) * t,
        )
    }
}

impl ClipPoint for Vec2 {
    fn xy(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    fn set_xy(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    fn lerp(a: Self, b: Self, t: f64) -> Self {
        a.lerp(b, t)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClipRect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl ClipRect {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Non-wrapping lon/lat bound. Wrapping bounds are taken as their
    /// unwrapped extent east of `west`.
    pub fn from_bound(bound: &GeoBound) -> Self {
        let east = if bound.wraps() { bound.east + 360.0 } else { bound.east };
        Self::new(bound.west, bound.south, east, bound.north)
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

#[derive(Copy, Clone)]
enum Edge {
    West,
    East,
    South,
    North,
}

impl Edge {
    fn inside(self, rect: &ClipRect, (x, y): (f64, f64)) -> bool {
        match self {
            Edge::West => x >= rect.min_x,
            Edge::East => x <= rect.max_x,
            Edge::South => y >= rect.min_y,
            Edge::North => y <= rect.max_y,
        }
    }

    fn crossing<P: ClipPoint>(self, rect: &ClipRect, a: P, b: P) -> P {
        let (ax, ay) = a.xy();
        let (bx, by) = b.xy();
        let (from, to, target) = match self {
            Edge::West => (ax, bx, rect.min_x),
            Edge::East => (ax, bx, rect.max_x),
            Edge::South => (ay, by, rect.min_y),
            Edge::North => (ay, by, rect.max_y),
        };
        let denom = to - from;
        let t = if denom.abs() > 1e-12 { (target - from) / denom } else { 0.0 };
        let mut p = P::lerp(a, b, t.clamp(0.0, 1.0));
        // Land exactly on the edge so a second pass sees the point as inside.
        let (x, y) = p.xy();
        match self {
            Edge::West | Edge::East => p.set_xy(target, y),
            Edge::South | Edge::North => p.set_xy(x, target),
        }
        p
    }
}

/// Sutherland–Hodgman clip of an open ring (no closing duplicate).
///
/// A ring fully inside comes back unchanged; fully outside comes back empty.
pub fn clip_ring<P: ClipPoint>(ring: &[P], rect: &ClipRect) -> Vec<P> {
    if ring.iter().all(|p| {
        let (x, y) = p.xy();
        rect.contains(x, y)
    }) {
        return ring.to_vec();
    }

    let mut poly = ring.to_vec();
    for edge in [Edge::West, Edge::East, Edge::South, Edge::North] {
        let Some(&last) = poly.last() else {
            break;
        };
        let mut out = Vec::with_capacity(poly.len() + 2);
        let mut prev = last;
        let mut prev_in = edge.inside(rect, prev.xy());
        for &cur in &poly {
            let cur_in = edge.inside(rect, cur.xy());
            if prev_in != cur_in {
                out.push(edge.crossing(rect, prev, cur));
            }
            if cur_in {
                out.push(cur);
            }
            prev = cur;
            prev_in = cur_in;
        }
        poly = out;
    }
    if poly.len() < 3 { Vec::new() } else { poly }
}

/// Liang–Barsky clip of one segment. Returns the parameter range kept.
pub fn clip_segment<P: ClipPoint>(a: P, b: P, rect: &ClipRect) -> Option<(f64, f64)> {
    let (ax, ay) = a.xy();
    let (bx, by) = b.xy();
    let (dx, dy) = (bx - ax, by - ay);
    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;
    for (p, q) in [
        (-dx, ax - rect.min_x),
        (dx, rect.max_x - ax),
        (-dy, ay - rect.min_y),
        (dy, rect.max_y - ay),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((t0, t1))
}

/// Clip a polyline, splitting it into chains where it leaves the rect.
pub fn clip_line<P: ClipPoint>(points: &[P], rect: &ClipRect) -> Vec<Vec<P>> {
    let mut chains: Vec<Vec<P>> = Vec::new();
    let mut current: Vec<P> = Vec::new();
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let Some((t0, t1)) = clip_segment(a, b, rect) else {
            if current.len() >= 2 {
                chains.push(std::mem::take(&mut current));
            }
            current.clear();
            continue;
        };
        let start = if t0 > 0.0 { P::lerp(a, b, t0) } else { a };
        let end = if t1 < 1.0 { P::lerp(a, b, t1) } else { b };
        if current.is_empty() || t0 > 0.0 {
            if current.len() >= 2 {
                chains.push(std::mem::take(&mut current));
            }
            current.clear();
            current.push(start);
        }
        current.push(end);
        if t1 < 1.0 {
            chains.push(std::mem::take(&mut current));
        }
    }
    if current.len() >= 2 {
        chains.push(current);
    }
    if points.len() == 1 {
        let (x, y) = points[0].xy();
        if rect.contains(x, y) {
            chains.push(points.to_vec());
        }
    }
    chains
}

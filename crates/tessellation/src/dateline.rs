//! Antimeridian handling for lon/lat geometry.

use foundation::bounds::GeoBound;
use foundation::math::GeoPoint;

use crate::clip::{ClipRect, clip_ring};

/// True when the short way between two longitudes crosses ±180°.
pub fn crosses(a_lon: f64, b_lon: f64) -> bool {
    let d = (b_lon - a_lon).abs();
    d > 180.0 && d < 360.0
}

/// Crossing vertex on the antimeridian, linear in lon/lat. Returned on the
/// side of `a` first, then on the side of `b`.
fn crossing(a: GeoPoint, b: GeoPoint) -> (GeoPoint, GeoPoint) {
    let (edge, b_lon) = if a.lon > b.lon {
        (180.0, b.lon + 360.0)
    } else {
        (-180.0, b.lon - 360.0)
    };
    let t = (edge - a.lon) / (b_lon - a.lon);
    let lat = a.lat + (b.lat - a.lat) * t;
    let alt = a.alt + (b.alt - a.alt) * t;
    (
        GeoPoint::with_alt(edge, lat, alt),
        GeoPoint::with_alt(-edge, lat, alt),
    )
}

/// Split a polyline at every antimeridian crossing into separate chains.
pub fn split_line(points: &[GeoPoint]) -> Vec<Vec<GeoPoint>> {
    let Some(&first) = points.first() else {
        return Vec::new();
    };
    let mut chains = Vec::new();
    let mut current = vec![first];
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if crosses(a.lon, b.lon) {
            let (end, start) = crossing(a, b);
            current.push(end);
            chains.push(std::mem::replace(&mut current, vec![start]));
        }
        current.push(b);
    }
    chains.push(current);
    chains
}

pub fn ring_crosses(ring: &[GeoPoint]) -> bool {
    let n = ring.len();
    (0..n).any(|i| crosses(ring[i].lon, ring[(i + 1) % n].lon))
}

/// Split a polygon whose rings cross the antimeridian into a western and an
/// eastern copy, each clipped to `bound`. Polygons that do not cross come
/// back as the single input polygon.
pub fn split_polygon(rings: &[Vec<GeoPoint>], bound: &GeoBound) -> Vec<Vec<Vec<GeoPoint>>> {
    if !rings.iter().any(|r| ring_crosses(r)) {
        return vec![rings.to_vec()];
    }
    let rect = ClipRect::from_bound(bound);
    let shifted = |shift: fn(f64) -> f64| -> Vec<Vec<GeoPoint>> {
        rings
            .iter()
            .map(|ring| {
                let moved: Vec<GeoPoint> = ring
                    .iter()
                    .map(|p| GeoPoint::with_alt(shift(p.lon), p.lat, p.alt))
                    .collect();
                clip_ring(&moved, &rect)
            })
            .collect()
    };

    let negative = shifted(|lon| if lon > 0.0 { lon - 360.0 } else { lon });
    let positive = shifted(|lon| if lon < 0.0 { lon + 360.0 } else { lon });

    [negative, positive]
        .into_iter()
        // A copy whose outer ring vanished has nothing left to draw.
        .filter(|poly| poly.first().is_some_and(|outer| !outer.is_empty()))
        .map(|poly| poly.into_iter().filter(|r| !r.is_empty()).collect())
        .collect()
}

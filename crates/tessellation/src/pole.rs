//! Pole vertices carry no meaningful longitude; give them their neighbours'.

use foundation::math::GeoPoint;

const POLE_EPS: f64 = 1e-9;

fn at_pole(p: &GeoPoint) -> bool {
    p.is_pole(POLE_EPS)
}

/// Replace each pole vertex by one copy per neighbour longitude.
///
/// With `closed`, the first and last vertices are neighbours.
pub fn duplicate_poles(points: &[GeoPoint], closed: bool) -> Vec<GeoPoint> {
    let n = points.len();
    let mut out = Vec::with_capacity(n + 2);
    for (i, &p) in points.iter().enumerate() {
        if !at_pole(&p) {
            out.push(p);
            continue;
        }
        let prev = match i {
            0 if closed && n > 1 => Some(points[n - 1]),
            0 => None,
            _ => Some(points[i - 1]),
        };
        let next = match i + 1 {
            j if j < n => Some(points[j]),
            _ if closed && n > 1 => Some(points[0]),
            _ => None,
        };
        let at = |lon: f64| GeoPoint::with_alt(lon, p.lat, p.alt);
        match (prev, next) {
            (Some(a), Some(b)) if a.lon != b.lon => {
                out.push(at(a.lon));
                out.push(at(b.lon));
            }
            (Some(a), _) => out.push(at(a.lon)),
            (None, Some(b)) => out.push(at(b.lon)),
            (None, None) => out.push(p),
        }
    }
    out
}

/// Duplicate pole vertices and split the line so that no segment joins two
/// pole vertices of different longitude.
pub fn split_line_at_poles(points: &[GeoPoint]) -> Vec<Vec<GeoPoint>> {
    let expanded = duplicate_poles(points, false);
    let mut chains = Vec::new();
    let mut current: Vec<GeoPoint> = Vec::new();
    for p in expanded {
        if let Some(last) = current.last()
            && at_pole(last)
            && at_pole(&p)
            && last.lon != p.lon
        {
            chains.push(std::mem::take(&mut current));
        }
        current.push(p);
    }
    if !current.is_empty() {
        chains.push(current);
    }
    chains.retain(|c| c.len() >= 2);
    chains
}

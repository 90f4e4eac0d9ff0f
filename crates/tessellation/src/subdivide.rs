use crs::Geoide;
use foundation::math::GeoPoint;

/// Number of pieces a segment spanning `angle_deg` is cut into.
pub fn segment_count(angle_deg: f64, subdivision_length: f64, max_subdivisions: u32) -> u32 {
    let n = (angle_deg / subdivision_length).ceil();
    if n.is_nan() || n < 1.0 {
        1
    } else {
        (n as u32).clamp(1, max_subdivisions.max(1))
    }
}

/// Points strictly between `a` and `b` following the body's curvature.
///
/// Chord points between the two surface positions are projected back to
/// lon/lat; altitude is interpolated linearly.
pub fn interior_points(
    a: GeoPoint,
    b: GeoPoint,
    geoide: &Geoide,
    subdivision_length: f64,
    max_subdivisions: u32,
) -> Vec<GeoPoint> {
    let pa = geoide.to_cartesian(GeoPoint::new(a.lon, a.lat));
    let pb = geoide.to_cartesian(GeoPoint::new(b.lon, b.lat));
    let angle = pa.angle_to(pb).to_degrees();
    let n = segment_count(angle, subdivision_length, max_subdivisions);
    (1..n)
        .map(|k| {
            let t = k as f64 / n as f64;
            let g = geoide.from_cartesian(pa.lerp(pb, t));
            // Keep longitudes on a's side of the antimeridian.
            let lon = a.lon + ((g.lon - a.lon + 180.0).rem_euclid(360.0) - 180.0);
            GeoPoint::with_alt(lon, g.lat, a.alt + (b.alt - a.alt) * t)
        })
        .collect()
}

/// Subdivide every segment of a path. With `closed`, the closing segment
/// from the last vertex back to the first is subdivided as well.
pub fn subdivide_path(
    points: &[GeoPoint],
    closed: bool,
    geoide: &Geoide,
    subdivision_length: f64,
    max_subdivisions: u32,
) -> Vec<GeoPoint> {
    let n = points.len();
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let a = points[i];
        out.push(a);
        let b = match (i + 1 < n, closed) {
            (true, _) => points[i + 1],
            (false, true) if n > 2 => points[0],
            _ => continue,
        };
        out.extend(interior_points(a, b, geoide, subdivision_length, max_subdivisions));
    }
    out
}

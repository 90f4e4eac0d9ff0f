//! Split segments at tile grid lines so draped geometry follows the
//! surface cell by cell.

use foundation::math::{StableF64, Vec2};

const T_EPS: f64 = 1e-9;

fn crossings(from: f64, to: f64, max: f64, ts: &mut Vec<StableF64>) {
    let d = to - from;
    if d.abs() < 1e-12 {
        return;
    }
    let lo = from.min(to).ceil().max(0.0);
    let hi = from.max(to).floor().min(max);
    let mut k = lo;
    while k <= hi {
        let t = (k - from) / d;
        if t > T_EPS && t < 1.0 - T_EPS {
            ts.push(StableF64(t));
        }
        k += 1.0;
    }
}

/// `a`, every crossing with the integer lines `u = k` and `v = k`
/// (`0 <= k <= size - 1`) strictly inside the segment, then `b`.
pub fn clamp_segment(a: Vec2, b: Vec2, size: usize) -> Vec<Vec2> {
    let max = size.saturating_sub(1) as f64;
    let mut ts = Vec::new();
    crossings(a.x, b.x, max, &mut ts);
    crossings(a.y, b.y, max, &mut ts);
    ts.sort();
    ts.dedup_by(|x, y| (x.0 - y.0).abs() < T_EPS);

    let mut out = Vec::with_capacity(ts.len() + 2);
    out.push(a);
    out.extend(ts.into_iter().map(|t| a.lerp(b, t.0)));
    out.push(b);
    out
}

/// Clamp every segment of a path, sharing endpoints between segments.
pub fn clamp_path(points: &[Vec2], closed: bool, size: usize) -> Vec<Vec2> {
    let n = points.len();
    if n < 2 {
        return points.to_vec();
    }
    let mut out: Vec<Vec2> = vec![points[0]];
    let segments = if closed { n } else { n - 1 };
    for i in 0..segments {
        let a = points[i];
        let b = points[(i + 1) % n];
        let pieces = clamp_segment(a, b, size);
        let last = if closed && i == n - 1 { pieces.len() - 1 } else { pieces.len() };
        out.extend_from_slice(&pieces[1..last]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{clamp_path, clamp_segment};
    use foundation::math::Vec2;
    use pretty_assertions::assert_eq;

    #[test]
    fn segment_inside_one_cell_keeps_endpoints() {
        let out = clamp_segment(Vec2::new(0.2, 0.3), Vec2::new(0.8, 0.9), 5);
        assert_eq!(out, vec![Vec2::new(0.2, 0.3), Vec2::new(0.8, 0.9)]);
    }

    #[test]
    fn crossings_are_sorted_along_the_segment() {
        let out = clamp_segment(Vec2::new(0.5, 0.5), Vec2::new(2.5, 1.5), 5);
        let xs: Vec<f64> = out.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.5, 1.0, 1.5, 2.0, 2.5]);
        assert_eq!(out[2].y, 1.0);
    }

    #[test]
    fn simultaneous_crossings_collapse() {
        let out = clamp_segment(Vec2::new(0.5, 0.5), Vec2::new(2.5, 2.5), 5);
        assert_eq!(
            out,
            vec![Vec2::new(0.5, 0.5), Vec2::new(1.0, 1.0), Vec2::new(2.0, 2.0), Vec2::new(2.5, 2.5)]
        );
    }

    #[test]
    fn lines_outside_the_grid_are_ignored() {
        let out = clamp_segment(Vec2::new(-3.5, 0.5), Vec2::new(-0.5, 0.5), 3);
        assert_eq!(out.len(), 2);
        let out = clamp_segment(Vec2::new(1.5, 0.5), Vec2::new(4.5, 0.5), 3);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn endpoints_on_grid_lines_are_not_duplicated() {
        let out = clamp_segment(Vec2::new(1.0, 0.5), Vec2::new(3.0, 0.5), 5);
        assert_eq!(out, vec![Vec2::new(1.0, 0.5), Vec2::new(2.0, 0.5), Vec2::new(3.0, 0.5)]);
    }

    #[test]
    fn closed_path_does_not_repeat_first_vertex() {
        let ring = [Vec2::new(0.5, 0.5), Vec2::new(1.5, 0.5), Vec2::new(1.5, 1.5)];
        let out = clamp_path(&ring, true, 3);
        assert_eq!(out.first(), Some(&Vec2::new(0.5, 0.5)));
        assert_ne!(out.last(), Some(&Vec2::new(0.5, 0.5)));
        // (0.5,0.5)-(1.5,0.5) crosses u=1, (1.5,0.5)-(1.5,1.5) crosses v=1,
        // the diagonal back crosses u=1 and v=1 at the same point.
        assert_eq!(out.len(), 3 + 3);
    }
}

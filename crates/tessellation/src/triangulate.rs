use earcutr::earcut;
use foundation::math::Vec2;
use tracing::warn;

use crate::clip::ClipPoint;
use crate::error::Diagnostic;

/// Drop the GeoJSON-style closing vertex if the ring repeats its first point.
pub fn drop_closing_duplicate<P: ClipPoint>(ring: &mut Vec<P>) {
    if ring.len() >= 2 {
        let (fx, fy) = ring[0].xy();
        let (lx, ly) = ring[ring.len() - 1].xy();
        if (fx - lx).abs() < 1e-9 && (fy - ly).abs() < 1e-9 {
            ring.pop();
        }
    }
}

fn distinct_vertices(ring: &[Vec2]) -> usize {
    let mut pts: Vec<(u64, u64)> = ring.iter().map(|p| (p.x.to_bits(), p.y.to_bits())).collect();
    pts.sort_unstable();
    pts.dedup();
    pts.len()
}

pub(crate) fn report(diagnostics: &mut Vec<Diagnostic>, diagnostic: Diagnostic) {
    warn!(%diagnostic, "skipping geometry part");
    diagnostics.push(diagnostic);
}

/// Triangles of one polygon: `rings[kept[i]]` contributes its vertices, in
/// order, to the index space of `indices`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolygonTriangles {
    pub kept: Vec<usize>,
    pub indices: Vec<u32>,
}

/// Earcut a polygon given in planar coordinates, first ring outer, the rest
/// holes. Degenerate holes are skipped; a degenerate outer ring or a failed
/// triangulation skips the whole polygon. Every skip is reported.
pub fn triangulate_polygon(
    rings: &[Vec<Vec2>],
    polygon: usize,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<PolygonTriangles> {
    let mut kept = Vec::new();
    let mut coords: Vec<f64> = Vec::new();
    let mut holes: Vec<usize> = Vec::new();
    let mut vertex_count = 0usize;

    for (ring_i, ring) in rings.iter().enumerate() {
        let vertices = distinct_vertices(ring);
        if vertices < 3 {
            report(
                diagnostics,
                Diagnostic::DegenerateRing {
                    polygon,
                    ring: ring_i,
                    vertices,
                },
            );
            if ring_i == 0 {
                return None;
            }
            continue;
        }
        if ring_i > 0 {
            holes.push(vertex_count);
        }
        for p in ring {
            coords.push(p.x);
            coords.push(p.y);
        }
        vertex_count += ring.len();
        kept.push(ring_i);
    }

    let indices = match earcut(&coords, &holes, 2) {
        Ok(ix) => ix,
        Err(_) => {
            report(
                diagnostics,
                Diagnostic::TriangulationFailed {
                    polygon,
                    reason: "earcut rejected the rings".into(),
                },
            );
            return None;
        }
    };
    if indices.is_empty() {
        report(diagnostics, Diagnostic::EmptyTriangulation { polygon });
        return None;
    }

    Some(PolygonTriangles {
        kept,
        indices: indices.into_iter().map(|i| i as u32).collect(),
    })
}

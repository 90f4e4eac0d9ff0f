use crs::{Crs, CrsError, CrsRegistry};
use formats::{Geometry, GeometryKind};
use foundation::math::{GeoPoint, RelativeOrigin, Vec2, Vec3};
use tiling::{Tile, TileError, TileSurface, TilingScheme};

use crate::clip::{ClipRect, clip_line, clip_ring};
use crate::config::TessellationConfig;
use crate::dateline;
use crate::error::{Diagnostic, TessellationError};
use crate::grid_clamp::clamp_path;
use crate::pole;
use crate::subdivide::subdivide_path;
use crate::triangulate::{drop_closing_duplicate, triangulate_polygon};
use crate::wrap::{WrappedRing, is_discontinuous};

/// Renderer-ready buffers for one geometry.
///
/// `positions` are xyz triples relative to `origin`; `line_indices` are
/// segment pairs, `triangle_indices` are triangle triples.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tessellation {
    pub origin: Vec3,
    pub positions: Vec<f32>,
    pub line_indices: Vec<u32>,
    pub triangle_indices: Vec<u32>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Tessellation {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// World position of vertex `i`.
    pub fn vertex(&self, i: usize) -> Vec3 {
        let p = &self.positions[i * 3..i * 3 + 3];
        self.origin + Vec3::new(p[0] as f64, p[1] as f64, p[2] as f64)
    }
}

struct MeshBuilder {
    origin: RelativeOrigin,
    out: Tessellation,
}

impl MeshBuilder {
    fn new(origin: Vec3) -> Self {
        Self {
            origin: RelativeOrigin::new(origin),
            out: Tessellation {
                origin,
                ..Tessellation::default()
            },
        }
    }

    fn push(&mut self, world: Vec3) -> u32 {
        let index = self.out.vertex_count() as u32;
        self.out.positions.extend_from_slice(&self.origin.to_f32(world));
        index
    }

    fn push_all(&mut self, worlds: &[Vec3]) -> u32 {
        let base = self.out.vertex_count() as u32;
        for &w in worlds {
            self.push(w);
        }
        base
    }

    fn outline(&mut self, base: u32, count: usize, closed: bool) {
        if count < 2 {
            return;
        }
        let count = count as u32;
        for i in 0..count - 1 {
            self.out.line_indices.extend_from_slice(&[base + i, base + i + 1]);
        }
        if closed && count > 2 {
            self.out.line_indices.extend_from_slice(&[base + count - 1, base]);
        }
    }

    fn line(&mut self, worlds: &[Vec3], closed: bool) {
        let base = self.push_all(worlds);
        self.outline(base, worlds.len(), closed);
    }

    /// Triangulate the polygon from `planar` coordinates (parallel to
    /// `worlds`), then push the rings that survived as closed outlines.
    /// Skipped rings leave no vertices behind.
    fn polygon(&mut self, worlds: &[Vec<Vec3>], planar: &[Vec<Vec2>], polygon: usize) {
        let Some(tris) = triangulate_polygon(planar, polygon, &mut self.out.diagnostics) else {
            return;
        };
        let mut global: Vec<u32> = Vec::new();
        for &r in &tris.kept {
            let base = self.push_all(&worlds[r]);
            self.outline(base, worlds[r].len(), true);
            global.extend((0..worlds[r].len() as u32).map(|j| base + j));
        }
        self.out
            .triangle_indices
            .extend(tris.indices.iter().map(|&i| global[i as usize]));
    }

    fn finish(self) -> Tessellation {
        self.out
    }
}

/// Outer ring first, holes after; closing duplicates removed.
fn polygons_of(geometry: &Geometry) -> Vec<Vec<Vec<GeoPoint>>> {
    let open = |rings: &Vec<Vec<GeoPoint>>| -> Vec<Vec<GeoPoint>> {
        rings
            .iter()
            .map(|r| {
                let mut r = r.clone();
                drop_closing_duplicate(&mut r);
                r
            })
            .collect()
    };
    match &geometry.kind {
        GeometryKind::Polygon(rings) => vec![open(rings)],
        GeometryKind::MultiPolygon(polys) => polys.iter().map(open).collect(),
        _ => Vec::new(),
    }
}

fn lines_of(geometry: &Geometry) -> Vec<Vec<GeoPoint>> {
    match &geometry.kind {
        GeometryKind::LineString(points) => vec![points.clone()],
        GeometryKind::MultiLineString(lines) => lines.clone(),
        _ => Vec::new(),
    }
}

fn points_of(geometry: &Geometry) -> Vec<GeoPoint> {
    match &geometry.kind {
        GeometryKind::Point(p) => vec![*p],
        GeometryKind::MultiPoint(ps) => ps.clone(),
        _ => Vec::new(),
    }
}

fn crosses_seam(points: &[GeoPoint]) -> bool {
    points
        .windows(2)
        .any(|w| (w[1].lon - w[0].lon).abs() > 180.0)
}

/// Turns caller geometry into renderer buffers in one coordinate system.
#[derive(Debug, Clone)]
pub struct Tessellator {
    crs: Crs,
    config: TessellationConfig,
}

impl Tessellator {
    pub fn new(crs: Crs, config: TessellationConfig) -> Result<Self, TessellationError> {
        config.validate()?;
        Ok(Self { crs, config })
    }

    pub fn from_registry(
        registry: &CrsRegistry,
        crs_name: &str,
        config: TessellationConfig,
    ) -> Result<Self, TessellationError> {
        Self::new(registry.get(crs_name)?.clone(), config)
    }

    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    pub fn config(&self) -> &TessellationConfig {
        &self.config
    }

    /// Tessellate on the globe or flat map of this tessellator's CRS.
    pub fn tessellate(&self, geometry: &Geometry) -> Tessellation {
        self.tessellate_free(geometry, None)
    }

    /// Like [`Tessellator::tessellate`], but on flat longitude-wrapping maps
    /// geometry crossing the seam is drawn continuously on the side facing
    /// `view_center_lon` instead of being cut.
    pub fn tessellate_wrapped(&self, geometry: &Geometry, view_center_lon: f64) -> Tessellation {
        let wrap = (self.crs.is_flat() && self.crs.wraps_longitude()).then_some(view_center_lon);
        self.tessellate_free(geometry, wrap)
    }

    /// Tessellate a geometry whose `crs` may differ from ours, converting
    /// its coordinates through `registry` first.
    pub fn tessellate_in(
        &self,
        geometry: &Geometry,
        registry: &CrsRegistry,
    ) -> Result<Tessellation, TessellationError> {
        let converted = self.convert(geometry, registry)?;
        Ok(self.tessellate(&converted))
    }

    fn convert(&self, geometry: &Geometry, registry: &CrsRegistry) -> Result<Geometry, CrsError> {
        let Some(from) = geometry.crs.as_deref() else {
            return Ok(geometry.clone());
        };
        if from == self.crs.name() {
            return Ok(geometry.clone());
        }
        let to = self.crs.name();
        let conv = |p: &GeoPoint| registry.convert(*p, from, to);
        let line = |ps: &Vec<GeoPoint>| ps.iter().map(conv).collect::<Result<Vec<_>, _>>();
        let rings = |rs: &Vec<Vec<GeoPoint>>| rs.iter().map(line).collect::<Result<Vec<_>, _>>();
        let kind = match &geometry.kind {
            GeometryKind::Point(p) => GeometryKind::Point(conv(p)?),
            GeometryKind::MultiPoint(ps) => GeometryKind::MultiPoint(line(ps)?),
            GeometryKind::LineString(ps) => GeometryKind::LineString(line(ps)?),
            GeometryKind::MultiLineString(ls) => GeometryKind::MultiLineString(rings(ls)?),
            GeometryKind::Polygon(rs) => GeometryKind::Polygon(rings(rs)?),
            GeometryKind::MultiPolygon(ps) => {
                GeometryKind::MultiPolygon(ps.iter().map(rings).collect::<Result<Vec<_>, _>>()?)
            }
        };
        Ok(Geometry::new(kind).with_crs(to))
    }

    fn origin_for(&self, geometry: &Geometry) -> Vec3 {
        match geometry.bound() {
            Some(b) => self.crs.from_geo_to_3d(b.center()),
            None => Vec3::ZERO,
        }
    }

    fn clip_rect(&self, wrapping: bool) -> Option<ClipRect> {
        if !self.crs.is_flat() || !self.config.clip_to_crs_bound {
            return None;
        }
        let bound = self.crs.geo_bound();
        let mut rect = ClipRect::from_bound(&bound);
        if wrapping {
            rect.min_x -= 360.0;
            rect.max_x += 360.0;
        }
        Some(rect)
    }

    fn curve(&self, points: &[GeoPoint], closed: bool) -> Vec<GeoPoint> {
        if self.crs.is_flat() {
            return points.to_vec();
        }
        subdivide_path(
            points,
            closed,
            self.crs.geoide(),
            self.config.subdivision_length,
            self.config.max_subdivisions,
        )
    }

    fn to_world(&self, points: &[GeoPoint]) -> Vec<Vec3> {
        points.iter().map(|&p| self.crs.from_geo_to_3d(p)).collect()
    }

    fn planar(&self, worlds: &[Vec<Vec3>]) -> Vec<Vec<Vec2>> {
        if self.crs.is_flat() {
            return worlds
                .iter()
                .map(|r| r.iter().map(|w| Vec2::new(w.x, w.y)).collect())
                .collect();
        }
        // Curved surface: flatten onto the tangent plane at the outer ring's
        // centroid.
        let outer = worlds.first().map(Vec::as_slice).unwrap_or_default();
        let sum = outer.iter().fold(Vec3::ZERO, |acc, &p| acc + p);
        let centroid = sum * (1.0 / outer.len().max(1) as f64);
        let frame = self.crs.local_frame(centroid);
        worlds
            .iter()
            .map(|r| {
                r.iter()
                    .map(|&w| {
                        let l = frame.to_local(w);
                        Vec2::new(l.x, l.y)
                    })
                    .collect()
            })
            .collect()
    }

    fn tessellate_free(&self, geometry: &Geometry, wrap: Option<f64>) -> Tessellation {
        let mut mesh = MeshBuilder::new(self.origin_for(geometry));
        let rect = self.clip_rect(wrap.is_some());

        for p in points_of(geometry) {
            if rect.is_none_or(|r| r.contains(p.lon, p.lat)) {
                mesh.push(self.crs.from_geo_to_3d(p));
            }
        }

        for line in lines_of(geometry) {
            let chains = match wrap {
                Some(view) if crosses_seam(&line) => {
                    vec![WrappedRing::new(&line).visible_copy(view).to_vec()]
                }
                _ => dateline::split_line(&line),
            };
            for chain in chains.iter().flat_map(|c| pole::split_line_at_poles(c)) {
                let pieces = match &rect {
                    Some(r) => clip_line(&chain, r),
                    None => vec![chain],
                };
                for piece in pieces {
                    let worlds = self.to_world(&self.curve(&piece, false));
                    mesh.line(&worlds, false);
                }
            }
        }

        for (index, rings) in polygons_of(geometry).into_iter().enumerate() {
            let copies = match wrap {
                Some(view) if rings.iter().any(|r| is_discontinuous(r)) => vec![
                    rings
                        .iter()
                        .map(|r| WrappedRing::new(r).visible_copy(view).to_vec())
                        .collect(),
                ],
                _ => dateline::split_polygon(&rings, &self.crs.geo_bound()),
            };
            for copy in copies {
                let mut prepared: Vec<Vec<GeoPoint>> = Vec::with_capacity(copy.len());
                for ring in &copy {
                    let ring = pole::duplicate_poles(ring, true);
                    let ring = match &rect {
                        Some(r) => clip_ring(&ring, r),
                        None => ring,
                    };
                    prepared.push(ring);
                }
                if prepared.first().is_none_or(Vec::is_empty) {
                    continue;
                }
                prepared.retain(|r| !r.is_empty());
                let worlds: Vec<Vec<Vec3>> = prepared
                    .iter()
                    .map(|r| self.to_world(&self.curve(r, true)))
                    .collect();
                let planar = self.planar(&worlds);
                mesh.polygon(&worlds, &planar, index);
            }
        }

        mesh.finish()
    }

    /// Drape a geometry onto a loaded tile.
    pub fn tessellate_on_tile<S: TilingScheme>(
        &self,
        geometry: &Geometry,
        tile: &Tile<S::Index>,
        scheme: &S,
    ) -> Result<Tessellation, TileError> {
        let surface = tile.surface(scheme)?;
        Ok(self.tessellate_on_surface(geometry, &surface))
    }

    /// Drape a geometry onto any tile surface: clip to the tile, split at
    /// grid lines and lift every vertex onto the interpolated surface.
    pub fn tessellate_on_surface(&self, geometry: &Geometry, surface: &impl TileSurface) -> Tessellation {
        let mut mesh = MeshBuilder::new(surface.origin());
        let size = surface.grid_size();
        let last = size.saturating_sub(1) as f64;
        let rect = ClipRect::new(0.0, 0.0, last, last);
        let lift = |g: &Vec2| surface.position(g.x, g.y);

        for p in points_of(geometry) {
            let g = surface.to_grid(p);
            if rect.contains(g.x, g.y) {
                mesh.push(lift(&g));
            }
        }

        for line in lines_of(geometry) {
            for chain in pole::split_line_at_poles(&line) {
                let grid: Vec<Vec2> = chain.iter().map(|&p| surface.to_grid(p)).collect();
                for piece in clip_line(&grid, &rect) {
                    let worlds: Vec<Vec3> = clamp_path(&piece, false, size).iter().map(lift).collect();
                    mesh.line(&worlds, false);
                }
            }
        }

        for (index, rings) in polygons_of(geometry).into_iter().enumerate() {
            let mut planar: Vec<Vec<Vec2>> = Vec::with_capacity(rings.len());
            for ring in &rings {
                let ring = pole::duplicate_poles(ring, true);
                let grid: Vec<Vec2> = ring.iter().map(|&p| surface.to_grid(p)).collect();
                let clipped = clip_ring(&grid, &rect);
                planar.push(clamp_path(&clipped, true, size));
            }
            if planar.first().is_none_or(Vec::is_empty) {
                continue;
            }
            planar.retain(|r| !r.is_empty());
            let worlds: Vec<Vec<Vec3>> = planar
                .iter()
                .map(|r| r.iter().map(lift).collect())
                .collect();
            mesh.polygon(&worlds, &planar, index);
        }

        mesh.finish()
    }
}

use crs::Crs;
use foundation::bounds::GeoBound;
use foundation::handles::Handle;
use foundation::math::{GeoPoint, LocalFrame, Vec2, Vec3};

use crate::error::TileError;
use crate::scheme::TilingScheme;

pub type TileHandle = Handle;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum TileState {
    #[default]
    NotLoaded,
    Loading,
    Loaded,
}

/// `size × size` surface samples of a tile, stored relative to `origin`.
///
/// Row `j` holds `v = j / (size - 1)`, column `i` holds `u = i / (size - 1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexGrid {
    size: usize,
    origin: Vec3,
    frame: LocalFrame,
    positions: Vec<Vec3>,
}

impl VertexGrid {
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn frame(&self) -> &LocalFrame {
        &self.frame
    }

    /// Sample `(i, j)` relative to [`VertexGrid::origin`].
    pub fn relative(&self, i: usize, j: usize) -> Vec3 {
        self.positions[j * self.size + i]
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// World position at fractional grid coordinates. Outside
    /// `[0, size - 1]²` the nearest border cell is extrapolated.
    pub fn compute_position(&self, u: f64, v: f64) -> Vec3 {
        let last = (self.size - 2) as f64;
        let i = u.floor().clamp(0.0, last);
        let j = v.floor().clamp(0.0, last);
        let (fu, fv) = (u - i, v - j);
        let (i, j) = (i as usize, j as usize);

        let p00 = self.relative(i, j);
        let p10 = self.relative(i + 1, j);
        let p01 = self.relative(i, j + 1);
        let p11 = self.relative(i + 1, j + 1);
        let bottom = p00 + (p10 - p00) * fu;
        let top = p01 + (p11 - p01) * fu;
        self.origin + bottom + (top - bottom) * fv
    }
}

/// One node of a tile tree.
#[derive(Debug, Clone)]
pub struct Tile<I> {
    index: I,
    level: u32,
    bound: GeoBound,
    parent: Option<TileHandle>,
    pub(crate) children: Option<[TileHandle; 4]>,
    pub(crate) state: TileState,
    pub(crate) pending: Option<u64>,
    grid: Option<VertexGrid>,
}

impl<I: Copy> Tile<I> {
    pub fn new<S: TilingScheme<Index = I>>(scheme: &S, index: I, parent: Option<TileHandle>) -> Self {
        Self {
            index,
            level: scheme.level(index),
            bound: scheme.bound(index),
            parent,
            children: None,
            state: TileState::NotLoaded,
            pending: None,
            grid: None,
        }
    }

    pub fn index(&self) -> I {
        self.index
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn bound(&self) -> GeoBound {
        self.bound
    }

    pub fn parent(&self) -> Option<TileHandle> {
        self.parent
    }

    pub fn children(&self) -> Option<[TileHandle; 4]> {
        self.children
    }

    pub fn state(&self) -> TileState {
        self.state
    }

    pub fn grid(&self) -> Result<&VertexGrid, TileError> {
        self.grid.as_ref().ok_or(TileError::VerticesNotGenerated)
    }

    pub fn has_vertices(&self) -> bool {
        self.grid.is_some()
    }

    /// Sample the tile surface on a `size × size` grid.
    ///
    /// Positions are kept relative to the tile center so they stay precise
    /// once narrowed to `f32`.
    pub fn generate_vertices<S: TilingScheme<Index = I>>(
        &mut self,
        scheme: &S,
        crs: &Crs,
        size: usize,
    ) -> Result<(), TileError> {
        if size < 2 {
            return Err(TileError::InvalidGridSize(size));
        }
        let origin = crs.from_geo_to_3d(scheme.position(self.index, 0.5, 0.5));
        let step = 1.0 / (size - 1) as f64;
        let mut positions = Vec::with_capacity(size * size);
        for j in 0..size {
            for i in 0..size {
                let geo = scheme.position(self.index, i as f64 * step, j as f64 * step);
                positions.push(crs.from_geo_to_3d(geo) - origin);
            }
        }
        let barycenter = positions.iter().fold(Vec3::ZERO, |acc, &p| acc + p) * (1.0 / positions.len() as f64);
        self.grid = Some(VertexGrid {
            size,
            origin,
            frame: crs.local_frame(origin + barycenter),
            positions,
        });
        Ok(())
    }

    pub fn clear_vertices(&mut self) {
        self.grid = None;
    }

    /// See [`VertexGrid::compute_position`].
    pub fn compute_position(&self, u: f64, v: f64) -> Result<Vec3, TileError> {
        Ok(self.grid()?.compute_position(u, v))
    }

    /// Express geographic points in this tile's grid units.
    pub fn lonlat_to_tile<S: TilingScheme<Index = I>>(
        &self,
        scheme: &S,
        points: &[GeoPoint],
    ) -> Result<Vec<Vec2>, TileError> {
        let scale = (self.grid()?.size - 1) as f64;
        Ok(points
            .iter()
            .map(|p| {
                let (u, v) = scheme.parametric(self.index, p.lon, p.lat);
                Vec2::new(u * scale, v * scale)
            })
            .collect())
    }

    /// Borrow this tile as a [`TileSurface`] for draping geometry.
    pub fn surface<'a, S: TilingScheme<Index = I>>(
        &'a self,
        scheme: &'a S,
    ) -> Result<TileView<'a, S>, TileError> {
        Ok(TileView {
            scheme,
            index: self.index,
            grid: self.grid()?,
        })
    }
}

/// First tile whose region contains `(lon, lat)`.
pub fn find_inside_tile<'a, S: TilingScheme>(
    scheme: &S,
    lon: f64,
    lat: f64,
    candidates: &'a [Tile<S::Index>],
) -> Option<&'a Tile<S::Index>> {
    candidates
        .iter()
        .find(|tile| scheme.contains(tile.index, lon, lat))
}

/// A tile surface that geometry can be draped onto.
pub trait TileSurface {
    /// Vertices per tile edge.
    fn grid_size(&self) -> usize;

    /// Anchor the surface positions are expressed relative to.
    fn origin(&self) -> Vec3;

    /// Grid coordinates of a geographic point, in `[0, size - 1]` inside
    /// the tile.
    fn to_grid(&self, geo: GeoPoint) -> Vec2;

    /// World position at grid coordinates.
    fn position(&self, u: f64, v: f64) -> Vec3;
}

#[derive(Debug, Clone, Copy)]
pub struct TileView<'a, S: TilingScheme> {
    scheme: &'a S,
    index: S::Index,
    grid: &'a VertexGrid,
}

impl<S: TilingScheme> TileSurface for TileView<'_, S> {
    fn grid_size(&self) -> usize {
        self.grid.size
    }

    fn origin(&self) -> Vec3 {
        self.grid.origin
    }

    fn to_grid(&self, geo: GeoPoint) -> Vec2 {
        let scale = (self.grid.size - 1) as f64;
        let (u, v) = self.scheme.parametric(self.index, geo.lon, geo.lat);
        Vec2::new(u * scale, v * scale)
    }

    fn position(&self, u: f64, v: f64) -> Vec3 {
        self.grid.compute_position(u, v)
    }
}

#[cfg(test)]
mod tests {
    use super::{Tile, TileSurface, find_inside_tile};
    use crate::error::TileError;
    use crate::quad::{GeoTiling, QuadIndex};
    use crate::scheme::TilingScheme;
    use crs::{Crs, CrsRegistry};
    use foundation::math::GeoPoint;

    fn assert_close(a: f64, b: f64, eps: f64) {
        assert!((a - b).abs() <= eps, "{a} != {b} (eps {eps})");
    }

    fn wgs84() -> Crs {
        CrsRegistry::with_defaults().get("EPSG:4326").expect("crs").clone()
    }

    #[test]
    fn position_before_generation_fails() {
        let tiling = GeoTiling::world();
        let tile = Tile::new(&tiling, QuadIndex::new(0, 0, 0), None);
        assert_eq!(tile.compute_position(0.0, 0.0), Err(TileError::VerticesNotGenerated));
        assert!(tile.surface(&tiling).is_err());
    }

    #[test]
    fn grid_size_is_validated() {
        let tiling = GeoTiling::world();
        let mut tile = Tile::new(&tiling, QuadIndex::new(0, 0, 0), None);
        assert_eq!(
            tile.generate_vertices(&tiling, &wgs84(), 1),
            Err(TileError::InvalidGridSize(1))
        );
    }

    #[test]
    fn grid_nodes_match_surface_positions() {
        let tiling = GeoTiling::world();
        let crs = wgs84();
        let index = QuadIndex::new(2, 9, 5);
        let mut tile = Tile::new(&tiling, index, None);
        tile.generate_vertices(&tiling, &crs, 5).expect("vertices");

        let p = tile.compute_position(2.0, 3.0).expect("position");
        let expected = crs.from_geo_to_3d(tiling.position(index, 0.5, 0.75));
        assert_close((p - expected).length(), 0.0, 1e-6);

        // Mid-cell samples are bilinear blends of the four corners.
        let grid = tile.grid().expect("grid");
        let mid = tile.compute_position(0.5, 0.5).expect("position");
        let avg = (grid.relative(0, 0) + grid.relative(1, 0) + grid.relative(0, 1) + grid.relative(1, 1)) * 0.25;
        assert_close((mid - (grid.origin() + avg)).length(), 0.0, 1e-6);
    }

    #[test]
    fn extrapolates_past_the_border() {
        let tiling = GeoTiling::world();
        let crs = CrsRegistry::with_defaults().get("EPSG:4087").expect("crs").clone();
        let mut tile = Tile::new(&tiling, QuadIndex::new(0, 1, 1), None);
        tile.generate_vertices(&tiling, &crs, 3).expect("vertices");
        let a = tile.compute_position(2.0, 1.0).expect("position");
        let b = tile.compute_position(2.5, 1.0).expect("position");
        let c = tile.compute_position(1.5, 1.0).expect("position");
        assert_close((b - a).length(), (a - c).length(), 1e-6);
        assert!(b.x > a.x);
    }

    #[test]
    fn lonlat_to_tile_uses_grid_units() {
        let tiling = GeoTiling::world();
        let mut tile = Tile::new(&tiling, QuadIndex::new(0, 2, 1), None);
        tile.generate_vertices(&tiling, &wgs84(), 9).expect("vertices");
        let pts = tile
            .lonlat_to_tile(&tiling, &[GeoPoint::new(0.0, 0.0), GeoPoint::new(45.0, 45.0)])
            .expect("grid coords");
        assert_close(pts[0].x, 0.0, 1e-12);
        assert_close(pts[0].y, 0.0, 1e-12);
        assert_close(pts[1].x, 4.0, 1e-12);
        assert_close(pts[1].y, 4.0, 1e-12);

        let surface = tile.surface(&tiling).expect("surface");
        assert_eq!(surface.grid_size(), 9);
        let g = surface.to_grid(GeoPoint::new(90.0, 90.0));
        assert_close(g.x, 8.0, 1e-12);
        assert_close(g.y, 8.0, 1e-12);
    }

    #[test]
    fn finds_containing_tile() {
        let tiling = GeoTiling::world();
        let tiles: Vec<_> = tiling
            .level_zero_indices()
            .into_iter()
            .map(|i| Tile::new(&tiling, i, None))
            .collect();
        let hit = find_inside_tile(&tiling, -100.0, 30.0, &tiles).expect("tile");
        assert_eq!(hit.index(), QuadIndex::new(0, 0, 1));
        assert!(find_inside_tile(&tiling, -100.0, 30.0, &tiles[..1]).is_none());
    }
}

use serde::{Deserialize, Serialize};

use foundation::bounds::GeoBound;
use foundation::math::{GeoPoint, normalize_lon};

use crate::error::TileError;
use crate::scheme::TilingScheme;

/// Cell of a [`GeoTiling`]: column `x` from the west edge, row `y` from the
/// south edge, both counted at `level`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QuadIndex {
    pub level: u32,
    pub x: u32,
    pub y: u32,
}

impl QuadIndex {
    pub fn new(level: u32, x: u32, y: u32) -> Self {
        Self { level, x, y }
    }
}

/// Equirectangular quadtree over a lon/lat bound.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoTiling {
    cols: u32,
    rows: u32,
    bound: GeoBound,
}

impl GeoTiling {
    pub fn new(cols: u32, rows: u32, bound: GeoBound) -> Result<Self, TileError> {
        if cols == 0 || rows == 0 {
            return Err(TileError::InvalidConfig(format!(
                "quad root grid must be non-empty, got {cols}x{rows}"
            )));
        }
        if bound.width() <= 0.0 || bound.height() <= 0.0 {
            return Err(TileError::InvalidConfig("quad bound has no area".into()));
        }
        Ok(Self { cols, rows, bound })
    }

    /// 4×2 root tiles over the whole globe.
    pub fn world() -> Self {
        Self {
            cols: 4,
            rows: 2,
            bound: GeoBound::world(),
        }
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn root_bound(&self) -> GeoBound {
        self.bound
    }

    fn cell_size(&self, level: u32) -> (f64, f64) {
        let scale = (1u64 << level) as f64;
        (
            self.bound.width() / (self.cols as f64 * scale),
            self.bound.height() / (self.rows as f64 * scale),
        )
    }

    /// Longitude offset east of the west edge, in `[0, width]`.
    fn lon_offset(&self, lon: f64) -> f64 {
        if self.bound.width() >= 360.0 {
            let offset = (lon - self.bound.west).rem_euclid(360.0);
            // The east edge belongs to the last column.
            if offset == 0.0 && lon > self.bound.west { 360.0 } else { offset }
        } else {
            (lon - self.bound.west).rem_euclid(360.0)
        }
    }
}

impl Default for GeoTiling {
    fn default() -> Self {
        Self::world()
    }
}

impl TilingScheme for GeoTiling {
    type Index = QuadIndex;

    fn level_zero_indices(&self) -> Vec<QuadIndex> {
        let mut out = Vec::with_capacity((self.cols * self.rows) as usize);
        for y in 0..self.rows {
            for x in 0..self.cols {
                out.push(QuadIndex::new(0, x, y));
            }
        }
        out
    }

    fn children(&self, index: QuadIndex) -> [QuadIndex; 4] {
        let (x, y, level) = (index.x * 2, index.y * 2, index.level + 1);
        [
            QuadIndex::new(level, x, y),
            QuadIndex::new(level, x + 1, y),
            QuadIndex::new(level, x, y + 1),
            QuadIndex::new(level, x + 1, y + 1),
        ]
    }

    fn parent(&self, index: QuadIndex) -> Option<QuadIndex> {
        (index.level > 0).then(|| QuadIndex::new(index.level - 1, index.x / 2, index.y / 2))
    }

    fn level(&self, index: QuadIndex) -> u32 {
        index.level
    }

    fn locate(&self, lon: f64, lat: f64, level: u32) -> QuadIndex {
        let (dx, dy) = self.cell_size(level);
        let nx = self.cols as u64 * (1u64 << level);
        let ny = self.rows as u64 * (1u64 << level);
        let fx = (self.lon_offset(lon) / dx).floor();
        let fy = ((lat - self.bound.south) / dy).floor();
        let x = (fx.max(0.0) as u64).min(nx - 1);
        let y = (fy.max(0.0) as u64).min(ny - 1);
        QuadIndex::new(level, x as u32, y as u32)
    }

    fn bound(&self, index: QuadIndex) -> GeoBound {
        let (dx, dy) = self.cell_size(index.level);
        let west = self.bound.west + index.x as f64 * dx;
        let south = self.bound.south + index.y as f64 * dy;
        GeoBound {
            west: normalize_edge(west),
            south,
            east: normalize_edge(west + dx),
            north: south + dy,
        }
    }

    fn position(&self, index: QuadIndex, u: f64, v: f64) -> GeoPoint {
        let (dx, dy) = self.cell_size(index.level);
        GeoPoint::new(
            self.bound.west + (index.x as f64 + u) * dx,
            self.bound.south + (index.y as f64 + v) * dy,
        )
    }

    fn parametric(&self, index: QuadIndex, lon: f64, lat: f64) -> (f64, f64) {
        let (dx, dy) = self.cell_size(index.level);
        let west = self.bound.west + index.x as f64 * dx;
        // Measure longitude on the side nearest the tile center.
        let center = west + dx * 0.5;
        let lon = center + (lon - center + 180.0).rem_euclid(360.0) - 180.0;
        (
            (lon - west) / dx,
            (lat - self.bound.south) / dy - index.y as f64,
        )
    }

    fn contains(&self, index: QuadIndex, lon: f64, lat: f64) -> bool {
        self.bound(index).contains(lon, lat)
    }
}

fn normalize_edge(lon: f64) -> f64 {
    if lon == -180.0 { -180.0 } else { normalize_lon(lon) }
}

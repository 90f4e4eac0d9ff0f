//! Equal-area HEALPix tiling in the nested numbering.

pub mod nested;

pub use nested::MAX_ORDER;

use serde::{Deserialize, Serialize};

use foundation::bounds::GeoBound;
use foundation::math::GeoPoint;

use crate::scheme::TilingScheme;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HealpixIndex {
    pub order: u8,
    pub pixel: u64,
}

impl HealpixIndex {
    pub fn new(order: u8, pixel: u64) -> Self {
        Self { order, pixel }
    }

    pub fn face(self) -> u8 {
        nested::nest_to_xyf(self.order, self.pixel).2
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HealpixTiling;

impl HealpixTiling {
    pub fn new() -> Self {
        Self
    }

    /// Surface fraction covered by one pixel at `order`, in steradians.
    pub fn pixel_area(order: u8) -> f64 {
        4.0 * std::f64::consts::PI / nested::npix(order) as f64
    }

    fn face_xy(index: HealpixIndex, u: f64, v: f64) -> (u8, f64, f64) {
        let (ix, iy, face) = nested::nest_to_xyf(index.order, index.pixel);
        let ns = nested::nside(index.order) as f64;
        (face, (ix as f64 + u) / ns, (iy as f64 + v) / ns)
    }
}

impl TilingScheme for HealpixTiling {
    type Index = HealpixIndex;

    fn level_zero_indices(&self) -> Vec<HealpixIndex> {
        (0..12).map(|p| HealpixIndex::new(0, p)).collect()
    }

    fn children(&self, index: HealpixIndex) -> [HealpixIndex; 4] {
        let base = index.pixel << 2;
        [0, 1, 2, 3].map(|k| HealpixIndex::new(index.order + 1, base + k))
    }

    fn parent(&self, index: HealpixIndex) -> Option<HealpixIndex> {
        (index.order > 0).then(|| HealpixIndex::new(index.order - 1, index.pixel >> 2))
    }

    fn level(&self, index: HealpixIndex) -> u32 {
        index.order as u32
    }

    fn locate(&self, lon: f64, lat: f64, level: u32) -> HealpixIndex {
        let order = level.min(MAX_ORDER as u32) as u8;
        HealpixIndex::new(order, nested::lon_lat_to_pix(order, lon, lat))
    }

    fn bound(&self, index: HealpixIndex) -> GeoBound {
        let corners = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)].map(|(u, v)| {
            let (face, x, y) = Self::face_xy(index, u, v);
            let (lon, lat) = nested::face_xy_to_lon_lat(face, x, y);
            GeoPoint::new(lon, lat)
        });

        // Latitude is monotonic in x + y, so the extremes sit on the
        // southern and northern corners.
        let south = corners[0].lat;
        let north = corners[3].lat;

        let (face, x, y) = Self::face_xy(index, 0.0, 0.0);
        let touches_north = face < 4 && corners[3].is_pole(1e-9);
        let touches_south = face >= 8 && x == 0.0 && y == 0.0;
        if touches_north || touches_south {
            return GeoBound::new(-180.0, south, 180.0, north);
        }

        match GeoBound::from_points(corners.iter()) {
            Some(b) => GeoBound::new(b.west, south, b.east, north),
            None => GeoBound::new(-180.0, south, 180.0, north),
        }
    }

    fn position(&self, index: HealpixIndex, u: f64, v: f64) -> GeoPoint {
        let (face, x, y) = Self::face_xy(index, u, v);
        let (lon, lat) = nested::face_xy_to_lon_lat(face, x, y);
        GeoPoint::new(lon, lat)
    }

    fn parametric(&self, index: HealpixIndex, lon: f64, lat: f64) -> (f64, f64) {
        let (ix, iy, face) = nested::nest_to_xyf(index.order, index.pixel);
        let ns = nested::nside(index.order) as f64;
        let (x, y) = nested::lon_lat_to_face_xy(face, lon, lat);
        (x * ns - ix as f64, y * ns - iy as f64)
    }
}

use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

use formats::Geometry;
use foundation::bounds::GeoBound;
use foundation::math::GeoPoint;

/// Hierarchical subdivision of the lon/lat domain.
///
/// Each index covers a region; its four children partition that region.
/// `(u, v)` are tile-local parametric coordinates in `[0, 1]²`, with
/// `v` growing northwards (towards the north corner for HEALPix).
pub trait TilingScheme {
    type Index: Copy + Eq + Ord + Hash + Debug;

    fn level_zero_indices(&self) -> Vec<Self::Index>;

    /// Children in bottom-left, bottom-right, top-left, top-right order.
    fn children(&self, index: Self::Index) -> [Self::Index; 4];

    fn parent(&self, index: Self::Index) -> Option<Self::Index>;

    fn level(&self, index: Self::Index) -> u32;

    /// The index at `level` whose region contains `(lon, lat)`.
    fn locate(&self, lon: f64, lat: f64, level: u32) -> Self::Index;

    fn bound(&self, index: Self::Index) -> GeoBound;

    /// Geographic position of parametric coordinates inside `index`.
    fn position(&self, index: Self::Index, u: f64, v: f64) -> GeoPoint;

    /// Parametric coordinates of `(lon, lat)` relative to `index`.
    ///
    /// Points outside the tile map outside `[0, 1]²`.
    fn parametric(&self, index: Self::Index, lon: f64, lat: f64) -> (f64, f64);

    fn contains(&self, index: Self::Index, lon: f64, lat: f64) -> bool {
        self.locate(lon, lat, self.level(index)) == index
    }

    /// Root indices touched by any vertex of `geometry`, in first-seen order.
    fn overlapped_level_zero_indices(&self, geometry: &Geometry) -> Vec<Self::Index> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for p in geometry.flat_coordinates() {
            let index = self.locate(p.lon, p.lat, 0);
            if seen.insert(index) {
                out.push(index);
            }
        }
        out
    }
}

/// First candidate whose region contains `(lon, lat)`.
pub fn find_inside_index<S: TilingScheme>(
    scheme: &S,
    lon: f64,
    lat: f64,
    candidates: &[S::Index],
) -> Option<S::Index> {
    candidates
        .iter()
        .copied()
        .find(|&index| scheme.contains(index, lon, lat))
}

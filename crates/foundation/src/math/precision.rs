//! Precision policies.
//!
//! Tile vertex grids and tessellated geometry are computed in `f64` and
//! handed to the renderer as `f32` offsets from a local origin, which keeps
//! planet-scale coordinates precise. `StableF64` gives floats a total order
//! for sorting intersection parameters.

use core::cmp::Ordering;

use super::Vec3;

/// Renderer-facing position: `f32` offset from a high-precision origin.
pub type RelativeF32 = [f32; 3];

/// High-precision origin that world positions are expressed against.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RelativeOrigin {
    pub origin: Vec3,
}

impl RelativeOrigin {
    pub fn new(origin: Vec3) -> Self {
        Self { origin }
    }

    #[inline]
    pub fn to_f32(self, world: Vec3) -> RelativeF32 {
        let d = world - self.origin;
        [d.x as f32, d.y as f32, d.z as f32]
    }

    /// Re-express an offset from another origin as an offset from this one.
    #[inline]
    pub fn rebase(self, other: Vec3, offset: [f32; 3]) -> RelativeF32 {
        let world = other + Vec3::new(offset[0] as f64, offset[1] as f64, offset[2] as f64);
        self.to_f32(world)
    }
}

/// Float wrapper with a total order, used to sort intersection parameters.
/// `-0.0` orders equal to `0.0`; NaNs are collapsed and sort last.
#[derive(Debug, Copy, Clone, Default)]
pub struct StableF64(pub f64);

impl StableF64 {
    fn canonical(self) -> f64 {
        match self.0 {
            v if v == 0.0 => 0.0,
            v if v.is_nan() => f64::NAN,
            v => v,
        }
    }
}

impl PartialEq for StableF64 {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for StableF64 {}

impl PartialOrd for StableF64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StableF64 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical().total_cmp(&other.canonical())
    }
}

#[cfg(test)]
mod tests {
    use super::{RelativeOrigin, StableF64};

    use crate::math::Vec3;

    #[test]
    fn negative_zero_equals_zero() {
        assert_eq!(StableF64(-0.0), StableF64(0.0));
        assert!(StableF64(f64::NAN) > StableF64(f64::INFINITY));
    }

    #[test]
    fn sorts_parameters_deterministically() {
        let mut ts = vec![StableF64(0.75), StableF64(0.25), StableF64(-0.0), StableF64(0.5)];
        ts.sort();
        let sorted: Vec<f64> = ts.into_iter().map(|t| t.0).collect();
        assert_eq!(sorted, vec![0.0, 0.25, 0.5, 0.75]);
    }

    #[test]
    fn relative_origin_preserves_small_offsets() {
        let origin = Vec3::new(6_378_137.0, -2_000_000.0, 1_000_000.0);
        let world = Vec3::new(6_378_138.25, -2_000_001.0, 999_999.5);
        let rel = RelativeOrigin::new(origin).to_f32(world);
        assert_eq!(rel, [1.25, -1.0, -0.5]);
    }

    #[test]
    fn rebase_moves_offsets_between_origins() {
        let a = Vec3::new(1000.0, 0.0, 0.0);
        let b = Vec3::new(1010.0, 0.0, 0.0);
        let rel = RelativeOrigin::new(b).rebase(a, [12.5, 1.0, 0.0]);
        assert_eq!(rel, [2.5, 1.0, 0.0]);
    }
}

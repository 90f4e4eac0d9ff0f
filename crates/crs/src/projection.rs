use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use foundation::GeoBound;
use foundation::math::{GeoPoint, Vec2};
use serde::{Deserialize, Serialize};

/// Latitude limit of the square Mercator world.
pub const MERCATOR_MAX_LAT_DEG: f64 = 85.051_128_779_806_59;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pole {
    North,
    South,
}

/// Map projection used by flat CRSs. Planar coordinates are in the units of
/// the geoide radius passed to `project`/`unproject`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Projection {
    PlateCarree,
    Mercator,
    /// Azimuthal equidistant centered on a pole.
    Azimuthal { pole: Pole },
}

impl Projection {
    pub fn is_azimuthal(&self) -> bool {
        matches!(self, Projection::Azimuthal { .. })
    }

    /// Azimuthal maps have no longitude seam; the cylindrical ones wrap at ±180°.
    pub fn wraps_longitude(&self) -> bool {
        !self.is_azimuthal()
    }

    /// Geographic domain the projection can display.
    pub fn geo_bound(&self) -> GeoBound {
        match self {
            Projection::Mercator => {
                GeoBound::new(-180.0, -MERCATOR_MAX_LAT_DEG, 180.0, MERCATOR_MAX_LAT_DEG)
            }
            Projection::PlateCarree | Projection::Azimuthal { .. } => GeoBound::world(),
        }
    }

    pub fn project(&self, geo: GeoPoint, radius: f64) -> Vec2 {
        let lon = geo.lon.to_radians();
        match self {
            Projection::PlateCarree => Vec2::new(radius * lon, radius * geo.lat.to_radians()),
            Projection::Mercator => {
                let lat = geo
                    .lat
                    .clamp(-MERCATOR_MAX_LAT_DEG, MERCATOR_MAX_LAT_DEG)
                    .to_radians();
                Vec2::new(radius * lon, radius * (FRAC_PI_4 + lat * 0.5).tan().ln())
            }
            Projection::Azimuthal { pole } => {
                let lat = geo.lat.to_radians();
                let (sin_lon, cos_lon) = lon.sin_cos();
                match pole {
                    Pole::North => {
                        let rho = radius * (FRAC_PI_2 - lat);
                        Vec2::new(rho * sin_lon, -rho * cos_lon)
                    }
                    Pole::South => {
                        let rho = radius * (FRAC_PI_2 + lat);
                        Vec2::new(rho * sin_lon, rho * cos_lon)
                    }
                }
            }
        }
    }

    pub fn unproject(&self, p: Vec2, radius: f64) -> GeoPoint {
        match self {
            Projection::PlateCarree => {
                GeoPoint::new((p.x / radius).to_degrees(), (p.y / radius).to_degrees())
            }
            Projection::Mercator => {
                let lat = 2.0 * (p.y / radius).exp().atan() - FRAC_PI_2;
                GeoPoint::new((p.x / radius).to_degrees(), lat.to_degrees())
            }
            Projection::Azimuthal { pole } => {
                let rho = (p.x * p.x + p.y * p.y).sqrt();
                let (lon, lat) = match pole {
                    Pole::North => {
                        let lon = if rho > 0.0 { p.x.atan2(-p.y) } else { 0.0 };
                        (lon, FRAC_PI_2 - rho / radius)
                    }
                    Pole::South => {
                        let lon = if rho > 0.0 { p.x.atan2(p.y) } else { 0.0 };
                        (lon, rho / radius - FRAC_PI_2)
                    }
                };
                GeoPoint::new(lon.to_degrees(), lat.to_degrees())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MERCATOR_MAX_LAT_DEG, Pole, Projection};
    use foundation::math::GeoPoint;
    use proptest::prelude::*;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn mercator_square_world() {
        let corner = Projection::Mercator.project(GeoPoint::new(180.0, MERCATOR_MAX_LAT_DEG), 1.0);
        assert_close(corner.x, corner.y, 1e-9);
    }

    #[test]
    fn mercator_clamps_poles() {
        let p = Projection::Mercator.project(GeoPoint::new(0.0, 90.0), 1.0);
        assert!(p.y.is_finite());
    }

    #[test]
    fn azimuthal_pole_is_origin() {
        let p = Projection::Azimuthal { pole: Pole::North }.project(GeoPoint::new(42.0, 90.0), 1.0);
        assert_close(p.x, 0.0, 1e-12);
        assert_close(p.y, 0.0, 1e-12);
        assert!(!Projection::Azimuthal { pole: Pole::North }.wraps_longitude());
        assert!(Projection::PlateCarree.wraps_longitude());
    }

    #[test]
    fn deserializes_tagged_projection() {
        let p: Projection = serde_json::from_str(r#"{"type": "azimuthal", "pole": "south"}"#)
            .expect("parse projection");
        assert_eq!(p, Projection::Azimuthal { pole: Pole::South });
    }

    proptest! {
        #[test]
        fn projections_round_trip(lon in -179.0f64..179.0, lat in -84.0f64..84.0) {
            for proj in [
                Projection::PlateCarree,
                Projection::Mercator,
                Projection::Azimuthal { pole: Pole::North },
                Projection::Azimuthal { pole: Pole::South },
            ] {
                let rt = proj.unproject(proj.project(GeoPoint::new(lon, lat), 6_371_000.0), 6_371_000.0);
                prop_assert!((rt.lon - lon).abs() < 1e-7, "{proj:?} lon {} vs {}", rt.lon, lon);
                prop_assert!((rt.lat - lat).abs() < 1e-7, "{proj:?} lat {} vs {}", rt.lat, lat);
            }
        }
    }
}

use foundation::math::{Ellipsoid, GeoPoint, Vec3, WGS84_A, WGS84_F};
use serde::{Deserialize, Serialize};

/// Mean radius of Mars (IAU 2000), meters.
pub const MARS_RADIUS: f64 = 3_396_190.0;
/// Mean radius of the Moon (IAU 2000), meters.
pub const MOON_RADIUS: f64 = 1_737_400.0;

/// Reference body a CRS is anchored to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geoide {
    pub name: String,
    pub ellipsoid: Ellipsoid,
}

impl Geoide {
    pub fn new(name: impl Into<String>, radius: f64, flattening: f64) -> Self {
        Self {
            name: name.into(),
            ellipsoid: Ellipsoid {
                a: radius,
                f: flattening,
            },
        }
    }

    pub fn earth() -> Self {
        Self::new("WGS84", WGS84_A, WGS84_F)
    }

    pub fn mars() -> Self {
        Self::new("Mars_2000", MARS_RADIUS, 0.0)
    }

    pub fn moon() -> Self {
        Self::new("Moon_2000", MOON_RADIUS, 0.0)
    }

    /// Unit celestial sphere used for sky rendering.
    pub fn celestial_sphere() -> Self {
        Self::new("Sky", 1.0, 0.0)
    }

    pub fn radius(&self) -> f64 {
        self.ellipsoid.a
    }

    pub fn is_spherical(&self) -> bool {
        self.ellipsoid.is_sphere()
    }

    pub fn to_cartesian(&self, geo: GeoPoint) -> Vec3 {
        self.ellipsoid.to_cartesian(geo)
    }

    pub fn from_cartesian(&self, p: Vec3) -> GeoPoint {
        self.ellipsoid.from_cartesian(p)
    }

    pub fn surface_normal(&self, p: Vec3) -> Vec3 {
        self.ellipsoid.surface_normal(p)
    }
}

#[cfg(test)]
mod tests {
    use super::Geoide;
    use foundation::math::GeoPoint;

    #[test]
    fn sphere_conversion_matches_closed_form() {
        let moon = Geoide::moon();
        let r = moon.radius();
        let p = moon.to_cartesian(GeoPoint::with_alt(90.0, 0.0, 100.0));
        assert!((p.y - (r + 100.0)).abs() < 1e-6);
        assert!(p.x.abs() < 1e-6);
    }

    #[test]
    fn earth_is_not_spherical() {
        assert!(!Geoide::earth().is_spherical());
        assert!(Geoide::celestial_sphere().is_spherical());
    }
}

use serde::{Deserialize, Serialize};

use super::Vec3;

/// WGS84 semi-major axis (meters).
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening.
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// Geographic position: longitude/latitude in decimal degrees, altitude in
/// the units of the reference body (meters for planets, unit radius for the sky).
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
    #[serde(default)]
    pub alt: f64,
}

impl GeoPoint {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat, alt: 0.0 }
    }

    pub const fn with_alt(lon: f64, lat: f64, alt: f64) -> Self {
        Self { lon, lat, alt }
    }

    /// True when the point sits on one of the poles (within `eps` degrees).
    pub fn is_pole(&self, eps: f64) -> bool {
        (self.lat.abs() - 90.0).abs() <= eps
    }
}

/// Wrap a longitude into `(-180, 180]`.
pub fn normalize_lon(lon: f64) -> f64 {
    let mut l = lon % 360.0;
    if l <= -180.0 {
        l += 360.0;
    } else if l > 180.0 {
        l -= 360.0;
    }
    l
}

/// Oblate reference ellipsoid. A flattening of zero is an exact sphere.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ellipsoid {
    /// Equatorial radius.
    pub a: f64,
    /// Flattening.
    pub f: f64,
}

impl Ellipsoid {
    pub const WGS84: Self = Self {
        a: WGS84_A,
        f: WGS84_F,
    };

    pub const fn sphere(radius: f64) -> Self {
        Self { a: radius, f: 0.0 }
    }

    pub fn is_sphere(&self) -> bool {
        self.f == 0.0
    }

    /// Polar radius.
    pub fn b(&self) -> f64 {
        self.a * (1.0 - self.f)
    }

    /// First eccentricity squared.
    pub fn e2(&self) -> f64 {
        self.f * (2.0 - self.f)
    }

    /// Second eccentricity squared.
    pub fn ep2(&self) -> f64 {
        let b = self.b();
        (self.a * self.a - b * b) / (b * b)
    }

    pub fn to_cartesian(&self, geo: GeoPoint) -> Vec3 {
        let lat = geo.lat.to_radians();
        let lon = geo.lon.to_radians();
        let (sin_lat, cos_lat) = lat.sin_cos();
        let (sin_lon, cos_lon) = lon.sin_cos();

        if self.is_sphere() {
            let r = self.a + geo.alt;
            return Vec3::new(r * cos_lat * cos_lon, r * cos_lat * sin_lon, r * sin_lat);
        }

        let e2 = self.e2();
        let n = self.a / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        let x = (n + geo.alt) * cos_lat * cos_lon;
        let y = (n + geo.alt) * cos_lat * sin_lon;
        let z = (n * (1.0 - e2) + geo.alt) * sin_lat;
        Vec3::new(x, y, z)
    }

    pub fn from_cartesian(&self, p: Vec3) -> GeoPoint {
        let horizontal = (p.x * p.x + p.y * p.y).sqrt();
        let lon = p.y.atan2(p.x);

        if self.is_sphere() {
            let r = p.length();
            if r == 0.0 {
                return GeoPoint::with_alt(0.0, 0.0, -self.a);
            }
            let lat = (p.z / r).clamp(-1.0, 1.0).asin();
            return GeoPoint::with_alt(lon.to_degrees(), lat.to_degrees(), r - self.a);
        }

        let b = self.b();
        if horizontal < 1e-9 {
            let lat = if p.z >= 0.0 { 90.0 } else { -90.0 };
            return GeoPoint::with_alt(lon.to_degrees(), lat, p.z.abs() - b);
        }

        // Bowring's closed-form approximation.
        let theta = (p.z * self.a).atan2(horizontal * b);
        let (sin_theta, cos_theta) = theta.sin_cos();
        let lat = (p.z + self.ep2() * b * sin_theta * sin_theta * sin_theta)
            .atan2(horizontal - self.e2() * self.a * cos_theta * cos_theta * cos_theta);

        let sin_lat = lat.sin();
        let n = self.a / (1.0 - self.e2() * sin_lat * sin_lat).sqrt();
        let alt = horizontal / lat.cos() - n;

        GeoPoint::with_alt(lon.to_degrees(), lat.to_degrees(), alt)
    }

    /// Outward surface normal at a cartesian position.
    pub fn surface_normal(&self, p: Vec3) -> Vec3 {
        let a2 = self.a * self.a;
        let b = self.b();
        let b2 = b * b;
        Vec3::new(p.x / a2, p.y / a2, p.z / b2).normalize()
    }
}

use foundation::math::{GeoPoint, Vec3};
use serde::{Deserialize, Serialize};

/// Equatorial (J2000) to galactic rotation. Rows are the galactic axes
/// expressed in equatorial coordinates.
const EQUATORIAL_TO_GALACTIC: [[f64; 3]; 3] = [
    [-0.054_875_560_4, -0.873_437_090_2, -0.483_835_015_5],
    [0.494_109_427_9, -0.444_829_630_0, 0.746_982_244_5],
    [-0.867_666_149_0, -0.198_076_373_4, 0.455_983_776_2],
];

/// Celestial or body reference frame of a spherical CRS.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceFrame {
    #[default]
    Equatorial,
    Galactic,
    /// Planet-fixed frame; directions pass through unchanged.
    BodyFixed,
}

impl ReferenceFrame {
    pub fn to_equatorial(self, v: Vec3) -> Vec3 {
        match self {
            ReferenceFrame::Equatorial | ReferenceFrame::BodyFixed => v,
            ReferenceFrame::Galactic => mul_transposed(&EQUATORIAL_TO_GALACTIC, v),
        }
    }

    pub fn from_equatorial(self, v: Vec3) -> Vec3 {
        match self {
            ReferenceFrame::Equatorial | ReferenceFrame::BodyFixed => v,
            ReferenceFrame::Galactic => mul(&EQUATORIAL_TO_GALACTIC, v),
        }
    }
}

fn mul(m: &[[f64; 3]; 3], v: Vec3) -> Vec3 {
    Vec3::new(
        m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
        m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
        m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
    )
}

fn mul_transposed(m: &[[f64; 3]; 3], v: Vec3) -> Vec3 {
    Vec3::new(
        m[0][0] * v.x + m[1][0] * v.y + m[2][0] * v.z,
        m[0][1] * v.x + m[1][1] * v.y + m[2][1] * v.z,
        m[0][2] * v.x + m[1][2] * v.y + m[2][2] * v.z,
    )
}

/// Unit direction for a (lon, lat) pair; altitude is ignored.
pub fn direction_from_geo(geo: GeoPoint) -> Vec3 {
    let (sin_lat, cos_lat) = geo.lat.to_radians().sin_cos();
    let (sin_lon, cos_lon) = geo.lon.to_radians().sin_cos();
    Vec3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat)
}

/// Inverse of [`direction_from_geo`]; the returned altitude is zero.
pub fn geo_from_direction(v: Vec3) -> GeoPoint {
    let u = v.normalize();
    let lat = u.z.clamp(-1.0, 1.0).asin().to_degrees();
    let lon = if u.x == 0.0 && u.y == 0.0 {
        0.0
    } else {
        u.y.atan2(u.x).to_degrees()
    };
    GeoPoint::new(lon, lat)
}

use foundation::GeoBound;
use foundation::math::{GeoPoint, LocalFrame, Vec2, Vec3, normalize_lon};

use crate::frame::{ReferenceFrame, direction_from_geo, geo_from_direction};
use crate::geoide::Geoide;
use crate::projection::Projection;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum CrsKind {
    /// Rendered on the geoide surface in 3D.
    Spherical { frame: ReferenceFrame },
    /// Rendered on a plane through a map projection.
    Projected { projection: Projection },
}

/// Immutable coordinate reference system.
///
/// A CRS is never mutated in place: switching coordinate systems replaces the
/// whole value (see [`crate::GlobeContext`]).
#[derive(Debug, Clone, PartialEq)]
pub struct Crs {
    name: String,
    geoide: Geoide,
    kind: CrsKind,
}

impl Crs {
    pub fn spherical(name: impl Into<String>, geoide: Geoide, frame: ReferenceFrame) -> Self {
        Self {
            name: name.into(),
            geoide,
            kind: CrsKind::Spherical { frame },
        }
    }

    pub fn projected(name: impl Into<String>, geoide: Geoide, projection: Projection) -> Self {
        Self {
            name: name.into(),
            geoide,
            kind: CrsKind::Projected { projection },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn geoide(&self) -> &Geoide {
        &self.geoide
    }

    pub fn kind(&self) -> CrsKind {
        self.kind
    }

    pub fn projection(&self) -> Option<Projection> {
        match self.kind {
            CrsKind::Projected { projection } => Some(projection),
            CrsKind::Spherical { .. } => None,
        }
    }

    /// Frame used for direction conversions; projected CRSs are body fixed.
    pub fn frame(&self) -> ReferenceFrame {
        match self.kind {
            CrsKind::Spherical { frame } => frame,
            CrsKind::Projected { .. } => ReferenceFrame::BodyFixed,
        }
    }

    /// Map-projected CRSs render on a plane.
    pub fn is_flat(&self) -> bool {
        matches!(self.kind, CrsKind::Projected { .. })
    }

    pub fn is_projected(&self) -> bool {
        self.projection().is_some()
    }

    pub fn is_azimuthal(&self) -> bool {
        self.projection().is_some_and(|p| p.is_azimuthal())
    }

    /// Whether longitudes wrap at ±180°. False only for azimuthal maps.
    pub fn wraps_longitude(&self) -> bool {
        self.projection().is_none_or(|p| p.wraps_longitude())
    }

    /// Geographic extent rendered by this CRS.
    pub fn geo_bound(&self) -> GeoBound {
        match self.kind {
            CrsKind::Spherical { .. } => GeoBound::world(),
            CrsKind::Projected { projection } => projection.geo_bound(),
        }
    }

    pub fn from_geo_to_3d(&self, geo: GeoPoint) -> Vec3 {
        match self.kind {
            CrsKind::Spherical { .. } => self.geoide.to_cartesian(geo),
            CrsKind::Projected { projection } => {
                let p = projection.project(geo, self.geoide.radius());
                Vec3::new(p.x, p.y, geo.alt)
            }
        }
    }

    pub fn from_3d_to_geo(&self, p: Vec3) -> GeoPoint {
        match self.kind {
            CrsKind::Spherical { .. } => self.geoide.from_cartesian(p),
            CrsKind::Projected { projection } => {
                let geo = projection.unproject(Vec2::new(p.x, p.y), self.geoide.radius());
                GeoPoint::with_alt(geo.lon, geo.lat, p.z)
            }
        }
    }

    /// Local east/north/up frame at a world position produced by this CRS.
    pub fn local_frame(&self, world: Vec3) -> LocalFrame {
        if self.is_flat() {
            LocalFrame::axis_aligned(world)
        } else {
            LocalFrame::from_normal(world, self.geoide.surface_normal(world))
        }
    }

    /// Re-express a position of this CRS in `target`.
    ///
    /// The position is turned into a direction on this CRS's body, rotated
    /// through the equatorial frame into the target frame and read back as
    /// geographic coordinates of the target. Altitude is carried over.
    pub fn convert_to(&self, target: &Crs, geo: GeoPoint) -> GeoPoint {
        if self.frame() == target.frame() {
            return GeoPoint::with_alt(normalize_lon(geo.lon), geo.lat, geo.alt);
        }
        let dir = direction_from_geo(geo);
        let rotated = target.frame().from_equatorial(self.frame().to_equatorial(dir));
        let out = geo_from_direction(rotated);
        GeoPoint::with_alt(out.lon, out.lat, geo.alt)
    }
}

#[cfg(test)]
mod tests {
    use super::Crs;
    use crate::frame::ReferenceFrame;
    use crate::geoide::Geoide;
    use crate::projection::{MERCATOR_MAX_LAT_DEG, Pole, Projection};
    use foundation::math::GeoPoint;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn spherical_round_trip() {
        let crs = Crs::spherical("Moon_2000", Geoide::moon(), ReferenceFrame::BodyFixed);
        let geo = GeoPoint::with_alt(-120.0, 45.0, 250.0);
        let rt = crs.from_3d_to_geo(crs.from_geo_to_3d(geo));
        assert_close(rt.lon, geo.lon, 1e-9);
        assert_close(rt.lat, geo.lat, 1e-9);
        assert_close(rt.alt, geo.alt, 1e-6);
        assert!(!crs.is_flat());
        assert!(crs.wraps_longitude());
    }

    #[test]
    fn projected_flags() {
        let merc = Crs::projected("EPSG:3857", Geoide::earth(), Projection::Mercator);
        assert!(merc.is_flat());
        assert!(merc.is_projected());
        assert!(!merc.is_azimuthal());
        assert!(merc.wraps_longitude());
        assert_eq!(merc.geo_bound().north, MERCATOR_MAX_LAT_DEG);

        let az = Crs::projected(
            "Azimuthal",
            Geoide::earth(),
            Projection::Azimuthal { pole: Pole::North },
        );
        assert!(az.is_azimuthal());
        assert!(!az.wraps_longitude());
    }

    #[test]
    fn projected_keeps_altitude_on_z() {
        let crs = Crs::projected("EPSG:4087", Geoide::earth(), Projection::PlateCarree);
        let p = crs.from_geo_to_3d(GeoPoint::with_alt(10.0, 20.0, 42.0));
        assert_eq!(p.z, 42.0);
        let rt = crs.from_3d_to_geo(p);
        assert_close(rt.lon, 10.0, 1e-9);
        assert_close(rt.lat, 20.0, 1e-9);
        assert_eq!(rt.alt, 42.0);
    }

    #[test]
    fn same_frame_conversion_is_identity() {
        let a = Crs::spherical("EPSG:4326", Geoide::earth(), ReferenceFrame::BodyFixed);
        let b = Crs::projected("EPSG:3857", Geoide::earth(), Projection::Mercator);
        let geo = GeoPoint::new(12.5, -33.0);
        assert_eq!(a.convert_to(&b, geo), geo);
    }
}

use std::collections::BTreeMap;

use foundation::math::GeoPoint;

use crate::config::CrsConfig;
use crate::crs::Crs;
use crate::error::CrsError;
use crate::frame::ReferenceFrame;
use crate::geoide::Geoide;
use crate::projection::{Pole, Projection};

/// Name → CRS lookup owned by a globe context.
#[derive(Debug, Clone, Default)]
pub struct CrsRegistry {
    entries: BTreeMap<String, Crs>,
    aliases: BTreeMap<String, String>,
}

impl CrsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the sky, planetary and flat systems the viewer ships with.
    pub fn with_defaults() -> Self {
        let mut r = Self::new();
        r.register(Crs::spherical(
            "Equatorial",
            Geoide::celestial_sphere(),
            ReferenceFrame::Equatorial,
        ));
        r.register(Crs::spherical(
            "Galactic",
            Geoide::celestial_sphere(),
            ReferenceFrame::Galactic,
        ));
        r.register(Crs::spherical(
            "EPSG:4326",
            Geoide::earth(),
            ReferenceFrame::BodyFixed,
        ));
        r.alias("CRS:84", "EPSG:4326");
        r.register(Crs::spherical(
            "Mars_2000",
            Geoide::mars(),
            ReferenceFrame::BodyFixed,
        ));
        r.register(Crs::spherical(
            "Moon_2000",
            Geoide::moon(),
            ReferenceFrame::BodyFixed,
        ));
        r.register(Crs::projected(
            "EPSG:3857",
            Geoide::earth(),
            Projection::Mercator,
        ));
        r.register(Crs::projected(
            "EPSG:4087",
            Geoide::earth(),
            Projection::PlateCarree,
        ));
        r.register(Crs::projected(
            "Azimuthal",
            Geoide::earth(),
            Projection::Azimuthal { pole: Pole::North },
        ));
        r
    }

    /// Register (or replace) a CRS under its own name.
    pub fn register(&mut self, crs: Crs) {
        self.entries.insert(crs.name().to_string(), crs);
    }

    pub fn alias(&mut self, alias: impl Into<String>, target: impl Into<String>) {
        self.aliases.insert(alias.into(), target.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    fn lookup(&self, name: &str) -> Option<&Crs> {
        let resolved = self.aliases.get(name).map(String::as_str).unwrap_or(name);
        self.entries.get(resolved)
    }

    pub fn get(&self, name: &str) -> Result<&Crs, CrsError> {
        self.lookup(name)
            .ok_or_else(|| CrsError::UnknownCrs(name.to_string()))
    }

    /// Convert a position between two registered systems.
    pub fn convert(&self, geo: GeoPoint, from: &str, to: &str) -> Result<GeoPoint, CrsError> {
        let (Some(src), Some(dst)) = (self.lookup(from), self.lookup(to)) else {
            return Err(CrsError::UnsupportedConversion {
                from: from.to_string(),
                to: to.to_string(),
            });
        };
        Ok(src.convert_to(dst, geo))
    }

    /// Build a CRS from configuration. Nothing is registered.
    pub fn build(&self, config: &CrsConfig) -> Result<Crs, CrsError> {
        config.validate()?;

        let base = self.lookup(&config.name);
        let geoide = match (&config.geoide, base) {
            (Some(g), _) => Geoide::new(
                g.name.clone().unwrap_or_else(|| config.name.clone()),
                g.radius,
                g.flattening,
            ),
            (None, Some(base)) => base.geoide().clone(),
            (None, None) => {
                return Err(CrsError::InvalidConfig(format!(
                    "no geoide given and no registered CRS named {}",
                    config.name
                )));
            }
        };

        let projection = config
            .projection
            .or_else(|| base.and_then(Crs::projection));
        Ok(match projection {
            Some(projection) => Crs::projected(config.name.clone(), geoide, projection),
            None => {
                let frame = config
                    .frame
                    .or_else(|| base.map(Crs::frame))
                    .unwrap_or_default();
                Crs::spherical(config.name.clone(), geoide, frame)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::CrsRegistry;
    use crate::config::CrsConfig;
    use crate::error::CrsError;
    use crate::projection::Projection;
    use foundation::math::GeoPoint;

    #[test]
    fn resolves_aliases() {
        let r = CrsRegistry::with_defaults();
        assert_eq!(r.get("CRS:84").expect("alias").name(), "EPSG:4326");
    }

    #[test]
    fn unknown_name_is_an_error() {
        let r = CrsRegistry::with_defaults();
        assert_eq!(
            r.get("Pluto").unwrap_err(),
            CrsError::UnknownCrs("Pluto".to_string())
        );
    }

    #[test]
    fn conversion_with_unknown_name_is_unsupported() {
        let r = CrsRegistry::with_defaults();
        let err = r
            .convert(GeoPoint::new(0.0, 0.0), "Equatorial", "Nowhere")
            .unwrap_err();
        assert!(matches!(err, CrsError::UnsupportedConversion { .. }));
    }

    #[test]
    fn converts_equatorial_to_galactic_and_back() {
        let r = CrsRegistry::with_defaults();
        let geo = GeoPoint::new(83.633, 22.0145);
        let gal = r.convert(geo, "Equatorial", "Galactic").expect("to galactic");
        let back = r.convert(gal, "Galactic", "Equatorial").expect("to equatorial");
        assert!((back.lon - geo.lon).abs() < 1e-6);
        assert!((back.lat - geo.lat).abs() < 1e-6);
        assert!((gal.lon.rem_euclid(360.0) - 184.557).abs() < 0.01, "galactic lon {}", gal.lon);
        assert!((gal.lat + 5.784).abs() < 0.01, "galactic lat {}", gal.lat);
    }

    #[test]
    fn builds_projected_crs_over_registered_geoide() {
        let r = CrsRegistry::with_defaults();
        let cfg = CrsConfig::from_json_str(
            r#"{"name": "EPSG:4326", "projection": {"type": "mercator"}}"#,
        )
        .expect("config");
        let crs = r.build(&cfg).expect("build");
        assert!(crs.is_flat());
        assert_eq!(crs.projection(), Some(Projection::Mercator));
        assert_eq!(crs.geoide().name, "WGS84");
    }

    #[test]
    fn rejects_invalid_geoide() {
        let r = CrsRegistry::with_defaults();
        let cfg = CrsConfig::from_json_str(r#"{"name": "X", "geoide": {"radius": -1.0}}"#)
            .expect("config");
        assert!(matches!(r.build(&cfg), Err(CrsError::InvalidConfig(_))));
    }

    #[test]
    fn unknown_name_without_geoide_is_invalid() {
        let r = CrsRegistry::with_defaults();
        assert!(matches!(
            r.build(&CrsConfig::named("Vesta")),
            Err(CrsError::InvalidConfig(_))
        ));
    }
}

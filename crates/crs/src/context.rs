use foundation::math::GeoPoint;
use tracing::debug;

use crate::config::CrsConfig;
use crate::crs::Crs;
use crate::error::CrsError;
use crate::registry::CrsRegistry;

/// Per-globe session state: the CRS registry and the single active CRS.
///
/// Passed explicitly to whoever needs conversions; there is no process-wide
/// registry.
#[derive(Debug, Clone)]
pub struct GlobeContext {
    registry: CrsRegistry,
    crs: Crs,
}

impl GlobeContext {
    pub fn new(registry: CrsRegistry, crs_name: &str) -> Result<Self, CrsError> {
        let crs = registry.get(crs_name)?.clone();
        Ok(Self { registry, crs })
    }

    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    pub fn registry(&self) -> &CrsRegistry {
        &self.registry
    }

    /// Switch to another registered CRS. On error the previous CRS stays active.
    pub fn set_crs(&mut self, name: &str) -> Result<(), CrsError> {
        let next = self.registry.get(name)?.clone();
        debug!("active CRS {} -> {}", self.crs.name(), next.name());
        self.crs = next;
        Ok(())
    }

    /// Build a CRS from configuration, register it and make it active.
    pub fn set_crs_from_config(&mut self, config: &CrsConfig) -> Result<(), CrsError> {
        let next = self.registry.build(config)?;
        debug!("active CRS {} -> {} (from config)", self.crs.name(), next.name());
        self.registry.register(next.clone());
        self.crs = next;
        Ok(())
    }

    /// Bring a position declared in `from` into the active CRS.
    pub fn to_active(&self, geo: GeoPoint, from: &str) -> Result<GeoPoint, CrsError> {
        self.registry.convert(geo, from, self.crs.name())
    }
}

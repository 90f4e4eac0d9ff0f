use serde::{Deserialize, Serialize};

use crate::error::CrsError;
use crate::frame::ReferenceFrame;
use crate::projection::Projection;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoideConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub radius: f64,
    #[serde(default)]
    pub flattening: f64,
}

/// Declarative description of a coordinate system.
///
/// When `geoide` is omitted, the geoide of the registered CRS with the same
/// name is reused, so `{"name": "EPSG:4326", "projection": {"type": "mercator"}}`
/// describes a Mercator view of the WGS84 body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrsConfig {
    pub name: String,
    #[serde(default)]
    pub geoide: Option<GeoideConfig>,
    #[serde(default)]
    pub projection: Option<Projection>,
    #[serde(default)]
    pub frame: Option<ReferenceFrame>,
}

impl CrsConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            geoide: None,
            projection: None,
            frame: None,
        }
    }

    pub fn from_json_str(payload: &str) -> Result<Self, CrsError> {
        serde_json::from_str(payload).map_err(|e| CrsError::InvalidConfig(e.to_string()))
    }

    pub(crate) fn validate(&self) -> Result<(), CrsError> {
        if self.name.is_empty() {
            return Err(CrsError::InvalidConfig("CRS name must not be empty".to_string()));
        }
        if let Some(g) = &self.geoide {
            if !(g.radius.is_finite() && g.radius > 0.0) {
                return Err(CrsError::InvalidConfig(format!(
                    "geoide radius must be positive, got {}",
                    g.radius
                )));
            }
            if !(0.0..1.0).contains(&g.flattening) {
                return Err(CrsError::InvalidConfig(format!(
                    "geoide flattening must be in [0, 1), got {}",
                    g.flattening
                )));
            }
        }
        if self.projection.is_some()
            && matches!(
                self.frame,
                Some(ReferenceFrame::Equatorial | ReferenceFrame::Galactic)
            )
        {
            return Err(CrsError::InvalidConfig(
                "a projected CRS is always body fixed".to_string(),
            ));
        }
        Ok(())
    }
}

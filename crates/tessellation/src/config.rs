use serde::{Deserialize, Serialize};

use crate::error::TessellationError;

fn default_subdivision_length() -> f64 {
    2.0
}

fn default_max_subdivisions() -> u32 {
    64
}

fn default_clip_to_crs_bound() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TessellationConfig {
    /// Longest arc, in degrees, a segment may span on a curved surface
    /// before it is subdivided.
    #[serde(default = "default_subdivision_length")]
    pub subdivision_length: f64,
    #[serde(default = "default_max_subdivisions")]
    pub max_subdivisions: u32,
    /// Clip geometry to the visible bound of flat coordinate systems.
    #[serde(default = "default_clip_to_crs_bound")]
    pub clip_to_crs_bound: bool,
}

impl Default for TessellationConfig {
    fn default() -> Self {
        Self {
            subdivision_length: default_subdivision_length(),
            max_subdivisions: default_max_subdivisions(),
            clip_to_crs_bound: default_clip_to_crs_bound(),
        }
    }
}

impl TessellationConfig {
    pub fn from_json_str(payload: &str) -> Result<Self, TessellationError> {
        let config: Self = serde_json::from_str(payload)
            .map_err(|e| TessellationError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TessellationError> {
        if self.subdivision_length.is_nan() || self.subdivision_length <= 0.0 {
            return Err(TessellationError::InvalidConfig(format!(
                "subdivision_length must be positive, got {}",
                self.subdivision_length
            )));
        }
        if self.max_subdivisions == 0 {
            return Err(TessellationError::InvalidConfig(
                "max_subdivisions must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::TessellationConfig;

    #[test]
    fn defaults_and_overrides() {
        let config = TessellationConfig::from_json_str(r#"{"max_subdivisions": 8}"#).expect("parse");
        assert_eq!(config.max_subdivisions, 8);
        assert_eq!(config.subdivision_length, 2.0);
        assert!(config.clip_to_crs_bound);
    }

    #[test]
    fn rejects_non_positive_length() {
        assert!(TessellationConfig::from_json_str(r#"{"subdivision_length": 0}"#).is_err());
        assert!(TessellationConfig::from_json_str(r#"{"max_subdivisions": 0}"#).is_err());
    }
}

use serde::{Deserialize, Serialize};

use crate::error::TileError;
use crate::healpix::MAX_ORDER;

/// Which subdivision scheme a tile tree uses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchemeConfig {
    /// Lon/lat grid of `cols × rows` root tiles over the CRS bound.
    Quad {
        #[serde(default = "default_cols")]
        cols: u32,
        #[serde(default = "default_rows")]
        rows: u32,
    },
    Healpix,
}

impl Default for SchemeConfig {
    fn default() -> Self {
        Self::Quad {
            cols: default_cols(),
            rows: default_rows(),
        }
    }
}

fn default_cols() -> u32 {
    4
}

fn default_rows() -> u32 {
    2
}

fn default_tile_size() -> usize {
    9
}

fn default_max_level() -> u32 {
    20
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TilingConfig {
    #[serde(default)]
    pub scheme: SchemeConfig,
    /// Vertices per tile edge.
    #[serde(default = "default_tile_size")]
    pub tile_size: usize,
    #[serde(default = "default_max_level")]
    pub max_level: u32,
}

impl Default for TilingConfig {
    fn default() -> Self {
        Self {
            scheme: SchemeConfig::default(),
            tile_size: default_tile_size(),
            max_level: default_max_level(),
        }
    }
}

impl TilingConfig {
    pub fn from_json_str(payload: &str) -> Result<Self, TileError> {
        let config: Self =
            serde_json::from_str(payload).map_err(|e| TileError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TileError> {
        if self.tile_size < 2 {
            return Err(TileError::InvalidGridSize(self.tile_size));
        }
        if let SchemeConfig::Quad { cols, rows } = self.scheme
            && (cols == 0 || rows == 0)
        {
            return Err(TileError::InvalidConfig(format!(
                "quad root grid must be non-empty, got {cols}x{rows}"
            )));
        }
        if matches!(self.scheme, SchemeConfig::Healpix) && self.max_level > MAX_ORDER as u32 {
            return Err(TileError::InvalidConfig(format!(
                "healpix max_level {} exceeds {MAX_ORDER}",
                self.max_level
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{SchemeConfig, TilingConfig};
    use crate::error::TileError;

    #[test]
    fn empty_object_takes_defaults() {
        let config = TilingConfig::from_json_str("{}").expect("parse");
        assert_eq!(config, TilingConfig::default());
        assert_eq!(config.scheme, SchemeConfig::Quad { cols: 4, rows: 2 });
    }

    #[test]
    fn parses_healpix() {
        let config =
            TilingConfig::from_json_str(r#"{"scheme":{"type":"healpix"},"tile_size":5}"#)
                .expect("parse");
        assert_eq!(config.scheme, SchemeConfig::Healpix);
        assert_eq!(config.tile_size, 5);
    }

    #[test]
    fn rejects_degenerate_grid() {
        assert_eq!(
            TilingConfig::from_json_str(r#"{"tile_size":1}"#),
            Err(TileError::InvalidGridSize(1))
        );
        assert!(matches!(
            TilingConfig::from_json_str(r#"{"scheme":{"type":"quad","cols":0}}"#),
            Err(TileError::InvalidConfig(_))
        ));
    }
}

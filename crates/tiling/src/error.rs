use thiserror::Error;

use crate::tile::TileState;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TileError {
    #[error("tile vertices have not been generated")]
    VerticesNotGenerated,
    #[error("unknown or disposed tile")]
    UnknownTile,
    #[error("tile is not loaded (state: {0:?})")]
    NotLoaded(TileState),
    #[error("tile grid size must be at least 2, got {0}")]
    InvalidGridSize(usize),
    #[error("tile is already at the maximum level {0}")]
    MaxLevelReached(u32),
    #[error("invalid tiling configuration: {0}")]
    InvalidConfig(String),
}

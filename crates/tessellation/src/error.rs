use thiserror::Error;

use crs::CrsError;
use tiling::TileError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TessellationError {
    #[error("invalid tessellation configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Crs(#[from] CrsError),
    #[error(transparent)]
    Tile(#[from] TileError),
}

/// Non-fatal problem met while tessellating. The offending ring is skipped
/// and the rest of the geometry is still produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Diagnostic {
    #[error("polygon {polygon} ring {ring} has only {vertices} distinct vertices")]
    DegenerateRing {
        polygon: usize,
        ring: usize,
        vertices: usize,
    },
    #[error("polygon {polygon} could not be triangulated: {reason}")]
    TriangulationFailed { polygon: usize, reason: String },
    #[error("polygon {polygon} produced no triangles")]
    EmptyTriangulation { polygon: usize },
}

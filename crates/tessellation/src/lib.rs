//! Turns lon/lat geometry into vertex and index buffers, either free on the
//! globe or flat map, or draped onto the vertex grid of a tile.

pub mod clip;
pub mod config;
pub mod dateline;
pub mod error;
pub mod grid_clamp;
pub mod pole;
pub mod subdivide;
pub mod tessellator;
pub mod triangulate;
pub mod wrap;

pub use config::TessellationConfig;
pub use error::{Diagnostic, TessellationError};
pub use tessellator::{Tessellation, Tessellator};
pub use wrap::WrappedRing;

//! Hierarchical tilings of the globe and the tile tree built on them.

pub mod config;
pub mod error;
pub mod healpix;
pub mod load;
pub mod quad;
pub mod scheme;
pub mod tile;
pub mod tree;

pub use config::*;
pub use error::*;
pub use healpix::{HealpixIndex, HealpixTiling};
pub use load::*;
pub use quad::*;
pub use scheme::*;
pub use tile::*;
pub use tree::*;

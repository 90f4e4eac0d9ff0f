//! Coordinate reference systems: geographic positions to and from 3D world
//! coordinates on a reference body, map projections for flat rendering and
//! conversions between celestial reference frames.

pub mod config;
pub mod context;
pub mod crs;
pub mod error;
pub mod frame;
pub mod geoide;
pub mod projection;
pub mod registry;

pub use config::*;
pub use context::*;
pub use crs::*;
pub use error::*;
pub use frame::*;
pub use geoide::*;
pub use projection::*;
pub use registry::*;

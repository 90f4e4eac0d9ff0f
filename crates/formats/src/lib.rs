pub mod geometry;

pub use geometry::*;
pub use foundation::math::GeoPoint;

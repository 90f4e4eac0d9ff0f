use super::Vec3;

/// Local East-North-Up frame anchored at a world-space origin.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LocalFrame {
    pub origin: Vec3,
    pub east: Vec3,
    pub north: Vec3,
    pub up: Vec3,
}

impl LocalFrame {
    /// Frame whose `up` is the given surface normal. Near the poles the
    /// reference axis switches so `east` stays well defined.
    pub fn from_normal(origin: Vec3, normal: Vec3) -> Self {
        let up = normal.normalize();
        let axis = if up.z.abs() < 0.99 {
            Vec3::new(0.0, 0.0, 1.0)
        } else {
            Vec3::new(0.0, 1.0, 0.0)
        };
        let east = axis.cross(up).normalize();
        let north = up.cross(east);
        Self {
            origin,
            east,
            north,
            up,
        }
    }

    /// Frame aligned with the world axes, used by flat projections.
    pub fn axis_aligned(origin: Vec3) -> Self {
        Self {
            origin,
            east: Vec3::new(1.0, 0.0, 0.0),
            north: Vec3::new(0.0, 1.0, 0.0),
            up: Vec3::new(0.0, 0.0, 1.0),
        }
    }

    /// World point expressed as (east, north, up) offsets.
    pub fn to_local(&self, world: Vec3) -> Vec3 {
        let d = world - self.origin;
        Vec3::new(d.dot(self.east), d.dot(self.north), d.dot(self.up))
    }

    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.origin + self.east * local.x + self.north * local.y + self.up * local.z
    }
}

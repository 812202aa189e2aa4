mod point;
mod cuboid;

pub use point::Point3D;
pub use cuboid::Cuboid;

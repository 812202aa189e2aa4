//! Axis-aligned box, used to find how much of a straight segment lies inside a
//! volume. Its chord lengths are the reference path lengths against which
//! projected line integrals are checked.

use ncollide3d::query::RayCast;
use ncollide3d::shape;

use units::plain::Lengthf32;
use crate::Point3D;

type Ray      = ncollide3d::query::Ray    <Lengthf32>;
type Isometry = ncollide3d::math::Isometry<Lengthf32>;
type Vector   = ncollide3d::math::Vector  <Lengthf32>;
type Point    = ncollide3d::math::Point   <Lengthf32>;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cuboid {
    pub centre: Point3D,
    pub half_width: Point3D,
}

impl Cuboid {

    pub fn new(centre: Point3D, full_size: [Lengthf32; 3]) -> Self {
        Self { centre, half_width: Point3D::from_array(full_size) / 2.0 }
    }

    /// Point at which the segment from `p1` to `p2` enters the box, travelling
    /// from `p1`. `p1` itself if it lies inside.
    pub fn entry(&self, p1: Point3D, p2: Point3D) -> Option<Point3D> {
        let d = p2 - p1;
        let length = d.norm();
        if length == 0.0 { return None }
        let d = d / length;
        let ray = Ray::new(Point::new(p1.x, p1.y, p1.z), Vector::new(d.x, d.y, d.z));
        let Point3D { x, y, z } = self.centre;
        let iso = Isometry::translation(x, y, z);
        let Point3D { x, y, z } = self.half_width;
        shape::Cuboid::new(Vector::new(x, y, z))
            .toi_with_ray(&iso, &ray, length, true)
            .map(|toi| p1 + d * toi)
    }

    /// Length of the part of the segment `p1`–`p2` which lies inside the box.
    pub fn chord(&self, p1: Point3D, p2: Point3D) -> Lengthf32 {
        match (self.entry(p1, p2), self.entry(p2, p1)) {
            (Some(a), Some(b)) => (a - b).norm(),
            _ => 0.0,
        }
    }
}

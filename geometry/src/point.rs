use std::ops::{Add, AddAssign, Div, Index, Mul, Neg, Sub};
use units::plain::Anglef32;

/// Cartesian point or displacement. The same type serves for both, as the
/// ray-casting code freely mixes positions, directions and per-pixel basis
/// vectors expressed in the same frame.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point3D {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3D {

    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self { Self { x, y, z } }

    pub fn from_array([x, y, z]: [f32; 3]) -> Self { Self { x, y, z } }

    pub fn to_array(self) -> [f32; 3] { [self.x, self.y, self.z] }

    pub fn norm(self) -> f32 {
        let Self { x, y, z } = self;
        (x*x + y*y + z*z).sqrt()
    }

    pub fn component_mul(self, [a, b, c]: [f32; 3]) -> Self {
        Self { x: self.x * a, y: self.y * b, z: self.z * c }
    }

    pub fn component_div(self, [a, b, c]: [f32; 3]) -> Self {
        Self { x: self.x / a, y: self.y / b, z: self.z / c }
    }

    /// Rotate by `alpha` radians about the z-axis
    pub fn rotate_z(self, alpha: Anglef32) -> Self {
        let (sin, cos) = alpha.sin_cos();
        Self {
            x: self.x * cos - self.y * sin,
            y: self.y * cos + self.x * sin,
            z: self.z,
        }
    }
}

impl Add for Point3D {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self { x: self.x + rhs.x, y: self.y + rhs.y, z: self.z + rhs.z }
    }
}

impl AddAssign for Point3D {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Point3D {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self { x: self.x - rhs.x, y: self.y - rhs.y, z: self.z - rhs.z }
    }
}

impl Neg for Point3D {
    type Output = Self;
    fn neg(self) -> Self::Output { Self { x: -self.x, y: -self.y, z: -self.z } }
}

impl Mul<f32> for Point3D {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self::Output {
        Self { x: self.x * rhs, y: self.y * rhs, z: self.z * rhs }
    }
}

impl Div<f32> for Point3D {
    type Output = Self;
    fn div(self, rhs: f32) -> Self::Output {
        Self { x: self.x / rhs, y: self.y / rhs, z: self.z / rhs }
    }
}

impl Index<usize> for Point3D {
    type Output = f32;
    fn index(&self, index: usize) -> &Self::Output {
        match index {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("index {index} is out of bounds [0,2]")
        }
    }
}

//! Physical quantities used at the boundaries of the projector.
//!
//! Scanner dimensions are read from configuration files with explicit units
//! (`"100 mm"`, `"90 degrees"`) and converted to plain millimetres and radians
//! (see [`plain`]) before they reach the ray-casting code.

pub mod plain;

pub use uom;

pub mod mm {

  pub mod f32 {
    use uom::{ISQ, system};
    ISQ!(uom::si, f32, (millimeter, kilogram, second, ampere, kelvin, mole, candela));
  }

}

pub use uom::si::Quantity;
pub use mm::f32::{Angle, Length};

mod unit {
  pub use uom::si::{length::{micrometer, millimeter, centimeter},
                    angle ::{radian, degree, revolution},
  };
}

/// Generate a function called NAME which returns QUANTITY by interpreting its
/// argument as UNIT
///
/// wrap!(NAME QUANTITY UNIT);
macro_rules! wrap {
  ($name:ident $quantity:ident $unit:ident ) => {
    pub fn $name(x: f32) -> $quantity { $quantity::new::<unit::$unit>(x) }
  };
}

wrap!(um     Length  micrometer);
wrap!(mm     Length  millimeter);
wrap!(cm     Length  centimeter);
wrap!(radian Angle       radian);
wrap!(degree Angle       degree);
wrap!(turn   Angle   revolution);

// Reverse direction of the above
pub fn mm_    (x: Length) -> f32 { x.get::<unit::millimeter>() }
pub fn radian_(x: Angle ) -> f32 { x.get::<unit::radian>() }
pub fn degree_(x: Angle ) -> f32 { x.get::<unit::degree>() }

#[macro_export]
macro_rules! in_base_unit {
  ($value:expr) => {
    $crate::Quantity {
      dimension: std::marker::PhantomData,
      units: std::marker::PhantomData,
      value: $value,
    }
  };
}

#[macro_export]
macro_rules! assert_uom_eq {
  ($unit:ident, $lhs:expr, $rhs:expr, $algo:ident <= $tol:expr) => {
    $crate::float_eq::assert_float_eq!($lhs.get::<$unit>(), $rhs.get::<$unit>(), $algo <= $tol)
  };
}

pub use float_eq;

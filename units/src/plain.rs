//! Quantities which are simply type aliases for floats rather than `uom`
//! `Quantity`s.
//!
//! The ray-casting code works in a rescaled frame in which every voxel has
//! unit size along each axis, so its coordinates are dimensionless; converting
//! back to physical units happens at a single point (the physical step length).
//! These aliases only give clues in the source as to what a number represents.

/// Length in millimetres
pub type Lengthf32    = f32;
/// Angle in radians
pub type Anglef32     = f32;
/// Distance measured in voxels of the rescaled frame
pub type Voxelsf32    = f32;
/// Attenuation density, as stored in the volume
pub type Densityf32   = f32;
/// Accumulated line integral (density × length)
pub type Integralf64  = f64;

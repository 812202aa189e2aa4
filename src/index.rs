//! Index conventions for the volume and the detector.
//!
//! + Volume: x varies fastest, then y, then z.
//!
//! + Detector: pixels are stored column by column (U-major), with each column
//!   stored bottom-up: the pixel in column `u` and row `v` (row 0 at the top of
//!   the detector) lives in slot `u * nv + (nv - v - 1)`.

#[allow(non_camel_case_types)] pub type Index1_u = usize;
#[allow(non_camel_case_types)] pub type Index3_u = [usize; 3];
#[allow(non_camel_case_types)] pub type BoxDim_u = [usize; 3];
#[allow(non_camel_case_types)] pub type Pixel_u  = [usize; 2];

use std::ops::{Add, Div, Mul, Rem};

pub fn index3_to_1<T>([ix, iy, iz]: [T; 3], [nx, ny, _nz]: [T; 3]) -> T
where
    T: Mul<Output = T> + Add<Output = T>
{
    ix + (iy + iz * ny) * nx
}

#[allow(clippy::many_single_char_names)]
pub fn index1_to_3<T>(i: T, [nx, ny, _nz]: [T; 3]) -> [T; 3]
where
    T: Mul<Output = T> +
    Div<Output = T> +
    Rem<Output = T> +
    Copy
{
    let z = i / (nx * ny);
    let r = i % (nx * ny);
    let y = r / nx;
    let x = r % nx;
    [x,y,z]
}

/// Storage slot of the detector pixel in column `u`, row `v`
#[inline]
pub fn pixel_to_slot([u, v]: Pixel_u, nv: usize) -> Index1_u {
    u * nv + (nv - v - 1)
}

/// Column and row of the detector pixel stored in `slot`
#[inline]
pub fn slot_to_pixel(slot: Index1_u, nv: usize) -> Pixel_u {
    [slot / nv, nv - slot % nv - 1]
}

//! Ray setup kernel: one ray record per detector pixel.
//!
//! Each record holds the per-step displacement along the ray from the source
//! to the pixel (in the ray-casting frame), the number of steps needed to reach
//! the pixel, and the physical length of one step.

use rayon::prelude::*;

use geometry::Point3D;

use crate::device::{DeviceBuffer, Grid};
use crate::index::{slot_to_pixel, Index1_u};
use crate::scanner::Geometry;
use super::frame::RayFrame;

/// Number of `f32`s in one ray record: direction (3), step count, step length
pub const RECORD_LEN: usize = 5;

pub const DIR_X: usize = 0;
pub const DIR_Y: usize = 1;
pub const DIR_Z: usize = 2;
pub const STEPS: usize = 3;
pub const STEP_LENGTH: usize = 4;

/// Ray records of all detector pixels, record `i` at `[i * RECORD_LEN ..]`
pub type VectorBuffer = DeviceBuffer<f32>;

/// Ray record of the pixel stored in detector slot `idx`
pub fn ray_record(idx: Index1_u, geo: &Geometry, frame: &RayFrame) -> [f32; RECORD_LEN] {
    let [u, v] = slot_to_pixel(idx, geo.n_detec[1]);
    let pixel = frame.uv_origin + frame.delta_u * u as f32 + frame.delta_v * v as f32;
    let ray = pixel - frame.source;
    let length = (ray.norm() / geo.accuracy).ceil().max(1.0);
    let Point3D { x, y, z } = ray / length;
    let step_length = Point3D::new(x, y, z).component_mul(geo.d_voxel).norm();
    [x, y, z, length, step_length]
}

/// Fill `vectors` with the ray records of all `geo.n_pixels()` pixels, one
/// worker per pixel. Workers of the last group which lie beyond the detector
/// do nothing.
pub fn compute_vectors(grid: Grid, geo: &Geometry, frame: &RayFrame, vectors: &mut [f32]) {
    let n_pixels = geo.n_pixels();
    let group_size = grid.group_size;
    vectors[..n_pixels * RECORD_LEN]
        .par_chunks_mut(group_size * RECORD_LEN)
        .enumerate()
        .for_each(|(group, records)| {
            for (worker, record) in records.chunks_exact_mut(RECORD_LEN).enumerate() {
                let idx = group * group_size + worker;
                if idx >= n_pixels { break }
                record.copy_from_slice(&ray_record(idx, geo, frame));
            }
        });
}

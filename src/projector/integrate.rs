//! Ray integration kernel: one group of workers per detector pixel.
//!
//! The workers of a group share the pixel's ray: worker `w` takes samples
//! `w, w + n, w + 2n ...` (where `n` is the group size) past the skippable
//! prefix of the ray, accumulating its own partial sum. The partial sums are
//! then reduced to the line integral of the pixel.

use rayon::prelude::*;

use units::plain::Integralf64;

use crate::device::{reduce::reduce_group, Grid, VolumeTexture};
use super::frame::RayFrame;
use super::setup::{RECORD_LEN, DIR_X, DIR_Y, DIR_Z, STEPS, STEP_LENGTH};

/// Memory shared by the workers of one group
struct SharedMemory {
    record: [f32; RECORD_LEN],
    partials: Vec<f64>,
}

impl SharedMemory {
    fn new(group_size: usize) -> Self {
        Self { record: [0.0; RECORD_LEN], partials: vec![0.0; group_size] }
    }
}

/// Add the line integral through `texture` of every pixel's ray to that
/// pixel's entry in `detector`. Previous contents of `detector` are kept.
pub fn integrate_pixels(
    grid: Grid,
    frame: &RayFrame,
    vectors: &[f32],
    texture: &VolumeTexture,
    detector: &mut [f64],
) {
    debug_assert_eq!(grid.groups, detector.len());
    debug_assert_eq!(vectors.len(), detector.len() * RECORD_LEN);
    // A source within the bounding cylinder has nothing to skip
    let start = frame.max_dist.floor().max(0.0) as usize;
    detector
        .par_iter_mut()
        .zip(vectors.par_chunks_exact(RECORD_LEN))
        .for_each_init(
            || SharedMemory::new(grid.group_size),
            |shared, (pixel, record)| {
                *pixel += integrate_ray(shared, start, frame, record, texture);
            },
        );
}

fn integrate_ray(
    shared: &mut SharedMemory,
    start: usize,
    frame: &RayFrame,
    record: &[f32],
    texture: &VolumeTexture,
) -> Integralf64 {
    // Workers 0..RECORD_LEN each load one element of the record
    shared.record.copy_from_slice(record);
    // -- barrier --
    let r = shared.record;
    let (dx, dy, dz) = (r[DIR_X], r[DIR_Y], r[DIR_Z]);
    let steps = r[STEPS] as usize;
    let group_size = shared.partials.len();
    let s = frame.source;

    for (worker, partial) in shared.partials.iter_mut().enumerate() {
        *partial = (start + worker..steps)
            .step_by(group_size)
            .map(|offset| {
                let o = offset as f32;
                texture.sample(dx * o + s.x + 0.5, dy * o + s.y + 0.5, dz * o + s.z + 0.5) as f64
            })
            .sum();
    }
    // -- barrier --
    reduce_group(&mut shared.partials) * r[STEP_LENGTH] as f64
}

//! Cone-beam forward projection of a density volume onto a flat-panel
//! detector, for a sequence of projection angles.
//!
//! The volume is uploaded to the device once per call, the ray and detector
//! buffers are allocated once per call, and then for each angle in turn
//!
//! + `frame::compute_deltas` places source and detector in the ray-casting
//!   frame of the volume,
//!
//! + `setup::compute_vectors` derives one ray record per detector pixel,
//!
//! + `integrate::integrate_pixels` marches along every ray, adding its line
//!   integral to the detector buffer, which is then copied into that angle's
//!   output image.

pub mod frame;
pub mod integrate;
pub mod setup;

use std::path::Path;

use log::{debug, info, warn};

use units::plain::Integralf64;

use crate::device::{Device, ExecutionProfile};
use crate::error::{ProjectionError, Result};
use crate::index::{pixel_to_slot, Pixel_u};
use crate::scanner::Geometry;
use crate::utils::group_digits;
use frame::compute_deltas;
use integrate::integrate_pixels;
use setup::{compute_vectors, VectorBuffer, RECORD_LEN};

/// What happens to the detector buffer between consecutive angles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DetectorPolicy {
    /// Each angle's image holds only that angle's line integrals.
    #[default]
    ResetPerAngle,
    /// The buffer keeps its contents, so each angle's image also contains the
    /// integrals of all earlier angles.
    Accumulate,
}

/// One value per detector pixel, stored in slot order (see `crate::index`)
pub type DetectorImage = Vec<Integralf64>;

/// Detector images, one per projection angle
#[derive(Clone, Debug, PartialEq)]
pub struct Projections {
    n_detec: [usize; 2],
    images: Vec<DetectorImage>,
}

impl Projections {

    pub fn zeros(n_detec @ [nu, nv]: [usize; 2], n_angles: usize) -> Self {
        Self { n_detec, images: vec![vec![0.0; nu * nv]; n_angles] }
    }

    pub fn n_angles(&self) -> usize { self.images.len() }

    pub fn n_detec(&self) -> [usize; 2] { self.n_detec }

    pub fn images(&self) -> &[DetectorImage] { &self.images }

    pub fn images_mut(&mut self) -> &mut [DetectorImage] { &mut self.images }

    pub fn image(&self, angle: usize) -> &[Integralf64] { &self.images[angle] }

    /// Value of the pixel in column `u`, row `v` of the image of `angle`
    pub fn pixel(&self, angle: usize, pixel: Pixel_u) -> Integralf64 {
        self.images[angle][pixel_to_slot(pixel, self.n_detec[1])]
    }

    pub fn into_images(self) -> Vec<DetectorImage> { self.images }

    /// Write all images consecutively, each in slot order, as raw `f64`s
    pub fn write_to_raw_file(&self, path: &Path) -> std::io::Result<()> {
        crate::io::raw::write(self.images.iter().flatten().copied(), path)
    }
}

/// Forward projector bound to a device.
pub struct Projector<'d> {
    device: &'d Device,
    profile: ExecutionProfile,
    policy: DetectorPolicy,
}

impl<'d> Projector<'d> {

    pub fn new(device: &'d Device) -> Self {
        Self { device, profile: ExecutionProfile::default(), policy: DetectorPolicy::default() }
    }

    pub fn with_profile(mut self, profile: ExecutionProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_policy(mut self, policy: DetectorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Project `volume` (x fastest, then y, then z) at each of `angles`
    /// (radians).
    pub fn project(&self, volume: &[f32], geometry: &Geometry, angles: &[f64]) -> Result<Projections> {
        let mut projections = Projections::zeros(geometry.n_detec, angles.len());
        self.project_into(volume, geometry, angles, projections.images_mut())?;
        Ok(projections)
    }

    /// Like `project`, but writing into caller-provided images, one per angle.
    pub fn project_into(
        &self,
        volume: &[f32],
        geometry: &Geometry,
        angles: &[f64],
        output: &mut [DetectorImage],
    ) -> Result<()> {
        self.project_with_progress(volume, geometry, angles, output, |_| {})
    }

    /// Like `project_into`, calling `angle_done` with the index of each angle
    /// once its image has been written.
    pub fn project_with_progress(
        &self,
        volume: &[f32],
        geometry: &Geometry,
        angles: &[f64],
        output: &mut [DetectorImage],
        mut angle_done: impl FnMut(usize),
    ) -> Result<()> {
        let n_angles = angles.len();
        geometry.check_angle_count(n_angles)?;
        if output.len() != n_angles {
            return Err(ProjectionError::AngleCount { what: "output images", expected: n_angles, actual: output.len() })
        }
        if geometry.accuracy > 1.0 {
            warn!("accuracy {} exceeds one voxel: rays may skip part of the volume", geometry.accuracy);
        }

        let session = self.device.bind(self.profile)?;
        let texture = session.upload_volume(geometry.n_voxel, volume)?;
        let n_pixels = geometry.n_pixels();
        let mut vectors: VectorBuffer = session.alloc("ray vectors", n_pixels * RECORD_LEN)?;
        let mut detector = session.alloc::<Integralf64>("detector image", n_pixels)?;

        let [nx, ny, nz] = geometry.n_voxel;
        let [nu, nv] = geometry.n_detec;
        info!("projecting {nx}x{ny}x{nz} voxels onto {nu}x{nv} pixels at {} angles on {}",
              group_digits(n_angles), self.device.name());

        let setup_grid = session.setup_grid(n_pixels);
        let integration_grid = session.integration_grid(n_pixels);
        let mut geo = geometry.clone();
        for (i, (&alpha, image)) in angles.iter().zip(output.iter_mut()).enumerate() {
            geo.alpha = alpha as f32;
            let frame = compute_deltas(&geo, i);
            debug!("angle {i}: alpha = {alpha}, skipping {} samples", frame.max_dist.floor().max(0.0));

            session.launch("ray setup", setup_grid, |grid| {
                compute_vectors(grid, &geo, &frame, vectors.as_mut_slice())
            });
            if self.policy == DetectorPolicy::ResetPerAngle {
                detector.fill(0.0);
            }
            session.launch("ray integration", integration_grid, |grid| {
                integrate_pixels(grid, &frame, vectors.as_slice(), &texture, detector.as_mut_slice())
            });
            detector.copy_to(image)?;
            angle_done(i);
        }
        Ok(())
    }
}

/// Project `volume` at each of `angles` with the default profile and policy,
/// on a device using all available cores.
pub fn project(volume: &[f32], geometry: &Geometry, angles: &[f64]) -> Result<Projections> {
    let device = Device::open(0)?;
    Projector::new(&device).project(volume, geometry, angles)
}

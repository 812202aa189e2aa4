//! Cone-beam scanner geometry: the volume grid, the flat-panel detector, the
//! source distances and the per-angle offsets.
//!
//! All lengths are millimetres. The volume is centred on the rotation axis
//! (the z-axis) unless shifted by the per-angle origin offsets; the source
//! starts on the positive x-axis and the detector plane is perpendicular to
//! the x-axis, on the far side of the origin.

use units::plain::{Anglef32, Lengthf32, Voxelsf32};

use crate::error::{ProjectionError, Result};

/// Default sampling accuracy: two samples per voxel along each ray
pub const DEFAULT_ACCURACY: Voxelsf32 = 0.5;

#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    /// Number of voxels along x, y, z
    pub n_voxel: [usize; 3],
    /// Full physical size of the volume
    pub s_voxel: [Lengthf32; 3],
    /// Size of a single voxel
    pub d_voxel: [Lengthf32; 3],

    /// Number of detector pixels along U (horizontal) and V (vertical)
    pub n_detec: [usize; 2],
    /// Detector pixel pitch along U and V
    pub d_detec: [Lengthf32; 2],

    /// Distance from source to rotation origin
    pub dso: Lengthf32,
    /// Distance from source to detector plane
    pub dsd: Lengthf32,

    // One entry per projection angle
    pub off_detec_u: Vec<Lengthf32>,
    pub off_detec_v: Vec<Lengthf32>,
    pub off_orig_x: Vec<Lengthf32>,
    pub off_orig_y: Vec<Lengthf32>,
    pub off_orig_z: Vec<Lengthf32>,

    /// Distance between consecutive samples along a ray, in voxels
    pub accuracy: Voxelsf32,

    /// Current projection angle. Set by the projector for each angle in turn.
    pub alpha: Anglef32,
}

impl Geometry {

    /// Geometry without any offsets: they must be supplied (one per angle)
    /// before projecting, e.g. with `with_uniform_offsets`.
    pub fn new(
        n_voxel: [usize; 3],
        s_voxel: [Lengthf32; 3],
        n_detec: [usize; 2],
        d_detec: [Lengthf32; 2],
        dso: Lengthf32,
        dsd: Lengthf32,
    ) -> Self {
        let d_voxel = [
            s_voxel[0] / n_voxel[0] as f32,
            s_voxel[1] / n_voxel[1] as f32,
            s_voxel[2] / n_voxel[2] as f32,
        ];
        Self {
            n_voxel, s_voxel, d_voxel,
            n_detec, d_detec,
            dso, dsd,
            off_detec_u: vec![], off_detec_v: vec![],
            off_orig_x: vec![], off_orig_y: vec![], off_orig_z: vec![],
            accuracy: DEFAULT_ACCURACY,
            alpha: 0.0,
        }
    }

    pub fn with_accuracy(mut self, accuracy: Voxelsf32) -> Self {
        self.accuracy = accuracy;
        self
    }

    /// Use the same detector `[u, v]` and origin `[x, y, z]` offsets for each
    /// of `n_angles` angles.
    pub fn with_uniform_offsets(mut self, n_angles: usize, [u, v]: [Lengthf32; 2], [x, y, z]: [Lengthf32; 3]) -> Self {
        self.off_detec_u = vec![u; n_angles];
        self.off_detec_v = vec![v; n_angles];
        self.off_orig_x  = vec![x; n_angles];
        self.off_orig_y  = vec![y; n_angles];
        self.off_orig_z  = vec![z; n_angles];
        self
    }

    pub fn n_pixels(&self) -> usize {
        let [nu, nv] = self.n_detec;
        nu * nv
    }

    pub fn n_voxels(&self) -> usize {
        let [nx, ny, nz] = self.n_voxel;
        nx * ny * nz
    }

    /// Ensure that every per-angle array has exactly `n_angles` entries.
    pub fn check_angle_count(&self, n_angles: usize) -> Result<()> {
        let arrays = [
            ("off_detec_u", &self.off_detec_u),
            ("off_detec_v", &self.off_detec_v),
            ("off_orig_x" , &self.off_orig_x ),
            ("off_orig_y" , &self.off_orig_y ),
            ("off_orig_z" , &self.off_orig_z ),
        ];
        for (what, array) in arrays {
            if array.len() != n_angles {
                return Err(ProjectionError::AngleCount { what, expected: n_angles, actual: array.len() });
            }
        }
        Ok(())
    }
}

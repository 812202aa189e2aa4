//! Read-only sampling structure holding the volume on the device.
//!
//! Coordinates are non-normalized texel coordinates in which texel `i` covers
//! `[i, i+1)`, so its centre is at `i + 0.5`. Samples are interpolated linearly
//! between the 8 nearest texel centres (trilinear filtering). Texels outside
//! the grid read as zero (border addressing), so the interpolated value falls
//! off to zero within half a texel beyond the grid's edge.

use log::debug;
use ndarray::Array3;

use units::plain::Densityf32;

use crate::error::{ProjectionError, Result};
use crate::index::BoxDim_u;

pub struct VolumeTexture {
    /// Indexed as `[z, y, x]`, so that x varies fastest in memory
    texels: Array3<Densityf32>,
    n: BoxDim_u,
}

impl VolumeTexture {

    /// Copy `data` (x fastest, then y, then z) into a new texture.
    pub(super) fn upload(n @ [nx, ny, nz]: BoxDim_u, data: &[Densityf32]) -> Result<Self> {
        let expected = nx * ny * nz;
        if data.len() != expected {
            return Err(ProjectionError::Transfer { what: "volume", expected, actual: data.len() })
        }
        let mut copy = Vec::new();
        copy.try_reserve_exact(expected)
            .map_err(|_| ProjectionError::Allocation { what: "volume texture", bytes: expected * 4 })?;
        copy.extend_from_slice(data);
        let texels = Array3::from_shape_vec((nz, ny, nx), copy)
            .map_err(|_| ProjectionError::Transfer { what: "volume", expected, actual: data.len() })?;
        debug!("uploaded volume texture {nx}x{ny}x{nz}");
        Ok(Self { texels, n })
    }

    pub fn dimensions(&self) -> BoxDim_u { self.n }

    #[inline]
    fn texel(&self, x: i64, y: i64, z: i64) -> Densityf32 {
        if x < 0 || y < 0 || z < 0 { return 0.0 }
        self.texels
            .get([z as usize, y as usize, x as usize])
            .copied()
            .unwrap_or(0.0)
    }

    /// Trilinearly interpolated value at texel coordinates `(x, y, z)`
    #[inline]
    pub fn sample(&self, x: f32, y: f32, z: f32) -> Densityf32 {
        // Shift so that texel centres lie on integer coordinates
        let (x, y, z) = (x - 0.5, y - 0.5, z - 0.5);
        let (x0, y0, z0) = (x.floor(), y.floor(), z.floor());
        let [nx, ny, nz] = self.n;
        // No texel of the 2x2x2 neighbourhood lies inside the grid
        if x0 < -1.0 || y0 < -1.0 || z0 < -1.0
            || x0 >= nx as f32 || y0 >= ny as f32 || z0 >= nz as f32 { return 0.0 }
        let (a, b, c) = (x - x0, y - y0, z - z0);
        let (i, j, k) = (x0 as i64, y0 as i64, z0 as i64);

        let t = |di, dj, dk| self.texel(i + di, j + dj, k + dk);
        let lerp = |lo: f32, hi: f32, w: f32| lo + w * (hi - lo);

        let y0z0 = lerp(t(0, 0, 0), t(1, 0, 0), a);
        let y1z0 = lerp(t(0, 1, 0), t(1, 1, 0), a);
        let y0z1 = lerp(t(0, 0, 1), t(1, 0, 1), a);
        let y1z1 = lerp(t(0, 1, 1), t(1, 1, 1), a);
        let z0 = lerp(y0z0, y1z0, b);
        let z1 = lerp(y0z1, y1z1, b);
        lerp(z0, z1, c)
    }
}

impl Drop for VolumeTexture {
    fn drop(&mut self) {
        let [nx, ny, nz] = self.n;
        debug!("released volume texture {nx}x{ny}x{nz}");
    }
}

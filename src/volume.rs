use std::path::Path;

use units::plain::Densityf32;

use crate::index::{index1_to_3, index3_to_1, BoxDim_u, Index1_u, Index3_u};

pub type VolumeData = Vec<Densityf32>;

/// Densities on a regular grid of voxels, x varying fastest
#[derive(Clone, Debug, PartialEq)]
pub struct Volume {
    pub n: BoxDim_u,
    pub data: VolumeData,
}

impl Volume {

    pub fn uniform(n @ [nx, ny, nz]: BoxDim_u, density: Densityf32) -> Self {
        Self { n, data: vec![density; nx * ny * nz] }
    }

    /// Volume whose density in each voxel is given by `f` applied to the
    /// voxel's 3D index
    pub fn from_fn(n @ [nx, ny, nz]: BoxDim_u, f: impl Fn(Index3_u) -> Densityf32) -> Self {
        let data = (0..nx * ny * nz)
            .map(|i| f(index1_to_3(i, n)))
            .collect();
        Self { n, data }
    }

    pub fn from_raw_file(n @ [nx, ny, nz]: BoxDim_u, path: &Path) -> std::io::Result<Self> {
        let data = crate::io::raw::read_exactly(path, nx * ny * nz)?;
        Ok(Self { n, data })
    }

    pub fn write_to_raw_file(&self, path: &Path) -> std::io::Result<()> {
        crate::io::raw::write(self.data.iter().copied(), path)
    }

    pub fn as_slice(&self) -> &[Densityf32] { &self.data }
}

impl core::ops::IndexMut<Index1_u> for Volume {
    #[inline]
    fn index_mut(&mut self, i: Index1_u) -> &mut Self::Output { &mut self.data[i] }
}

impl core::ops::Index<Index1_u> for Volume {
    type Output = Densityf32;
    #[inline]
    fn index(&self, i: Index1_u) -> &Self::Output { &self.data[i] }
}

impl core::ops::IndexMut<Index3_u> for Volume {
    fn index_mut(&mut self, i3: Index3_u) -> &mut Self::Output {
        let i1 = index3_to_1(i3, self.n);
        &mut self.data[i1]
    }
}

impl core::ops::Index<Index3_u> for Volume {
    type Output = Densityf32;
    fn index(&self, i3: Index3_u) -> &Self::Output {
        let i1 = index3_to_1(i3, self.n);
        &self.data[i1]
    }
}

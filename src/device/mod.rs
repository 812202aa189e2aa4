//! Data-parallel compute device on which the projection kernels run.
//!
//! The device is a `rayon` thread pool which emulates the execution model the
//! kernels were designed for: a launch is a grid of *groups*, each group being
//! a fixed number of cooperating *workers* sharing a small scratch memory and
//! synchronizing on barriers. Groups of one launch run in parallel; the workers
//! of one group run phase by phase inside a single pool task, so every phase
//! boundary is a barrier. A launch returns once all its groups are done, so
//! consecutive launches are ordered.
//!
//! + `Device::open` creates the pool and reports its `DeviceLimits`.
//!
//! + `Device::bind` accepts an `ExecutionProfile` only if it fits those limits,
//!   returning a `Session` through which buffers are allocated, the volume is
//!   uploaded and kernels are launched. Everything acquired through a session
//!   is released when it is dropped, on success and error paths alike.

pub mod reduce;
pub mod texture;

pub use texture::VolumeTexture;

use log::debug;

use crate::error::{ProjectionError, Result};
use crate::projector::setup::RECORD_LEN;

/// Largest group the emulated hardware supports
pub const MAX_GROUP_SIZE: usize = 1024;

/// Group-shared memory available to each group
pub const SHARED_MEMORY_BYTES: usize = 48 * 1024;

/// Resource limits reported by a device
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceLimits {
    /// Maximum number of workers in one group
    pub max_group_size: usize,
    /// Group-shared memory available to each group
    pub shared_memory_bytes: usize,
    /// Number of groups which can execute concurrently
    pub concurrent_groups: usize,
}

/// The launch configuration used by the projector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExecutionProfile {
    /// Workers per group (= per detector pixel) in ray integration. Must be a
    /// power of two, at least `MIN_GROUP_SIZE`.
    pub group_size: usize,
    /// Workers per group in ray setup, one pixel per worker
    pub setup_group_size: usize,
}

impl Default for ExecutionProfile {
    fn default() -> Self {
        Self { group_size: MAX_GROUP_SIZE, setup_group_size: 256 }
    }
}

impl ExecutionProfile {

    pub const MIN_GROUP_SIZE: usize = 64;

    pub fn with_group_size(group_size: usize) -> Self {
        Self { group_size, ..Self::default() }
    }

    /// Shared memory needed by one ray-integration group: one partial sum per
    /// worker plus the pixel's ray record.
    pub fn shared_memory_bytes(&self) -> usize {
        self.group_size * std::mem::size_of::<f64>() + RECORD_LEN * std::mem::size_of::<f32>()
    }

    /// Reason why this profile cannot run within `limits`, if any
    fn incompatibility(&self, limits: &DeviceLimits) -> Option<String> {
        let &Self { group_size, setup_group_size } = self;
        if !group_size.is_power_of_two() {
            return Some(format!("group size {group_size} is not a power of two"));
        }
        if group_size < Self::MIN_GROUP_SIZE {
            return Some(format!("group size {group_size} is smaller than {}", Self::MIN_GROUP_SIZE));
        }
        if group_size > limits.max_group_size {
            return Some(format!("group size {group_size} exceeds device maximum {}", limits.max_group_size));
        }
        if setup_group_size == 0 || setup_group_size > limits.max_group_size {
            return Some(format!("setup group size {setup_group_size} outside 1..={}", limits.max_group_size));
        }
        let shared = self.shared_memory_bytes();
        if shared > limits.shared_memory_bytes {
            return Some(format!("needs {shared} bytes of shared memory, device offers {}", limits.shared_memory_bytes));
        }
        None
    }
}

/// A launch grid: `groups` groups of `group_size` workers each
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grid {
    pub groups: usize,
    pub group_size: usize,
}

impl Grid {
    /// Smallest grid with at least one worker per item
    pub fn covering(n_items: usize, group_size: usize) -> Self {
        Self { groups: n_items.div_ceil(group_size), group_size }
    }

    pub fn n_workers(&self) -> usize { self.groups * self.group_size }
}

pub struct Device {
    name: String,
    pool: rayon::ThreadPool,
    limits: DeviceLimits,
}

impl Device {

    /// Open the device with `n_threads` pool threads (0: one per core)
    pub fn open(n_threads: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .thread_name(|i| format!("conebeam-worker-{i}"))
            .build()
            .map_err(|e| ProjectionError::NoDevice(e.to_string()))?;
        let limits = DeviceLimits {
            max_group_size: MAX_GROUP_SIZE,
            shared_memory_bytes: SHARED_MEMORY_BYTES,
            concurrent_groups: pool.current_num_threads(),
        };
        let name = format!("cpu ({} threads)", limits.concurrent_groups);
        debug!("opened device {name}: {limits:?}");
        Ok(Self { name, pool, limits })
    }

    /// Emulate hardware with different limits
    pub fn with_limits(mut self, limits: DeviceLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn name(&self) -> &str { &self.name }

    pub fn limits(&self) -> DeviceLimits { self.limits }

    /// Bind `profile` to the device, refusing profiles the device cannot run.
    pub fn bind(&self, profile: ExecutionProfile) -> Result<Session<'_>> {
        if let Some(reason) = profile.incompatibility(&self.limits) {
            return Err(ProjectionError::IncompatibleProfile { device: self.name.clone(), reason })
        }
        debug!("bound {profile:?} to device {}", self.name);
        Ok(Session { device: self, profile })
    }
}

/// A profile bound to a device.
pub struct Session<'d> {
    device: &'d Device,
    profile: ExecutionProfile,
}

impl<'d> Session<'d> {

    pub fn profile(&self) -> ExecutionProfile { self.profile }

    /// One worker per pixel
    pub fn setup_grid(&self, n_pixels: usize) -> Grid {
        Grid::covering(n_pixels, self.profile.setup_group_size)
    }

    /// One group per pixel
    pub fn integration_grid(&self, n_pixels: usize) -> Grid {
        Grid { groups: n_pixels, group_size: self.profile.group_size }
    }

    /// Zero-initialized buffer of `len` elements
    pub fn alloc<T: Copy + Default>(&self, what: &'static str, len: usize) -> Result<DeviceBuffer<T>> {
        DeviceBuffer::zeroed(what, len)
    }

    /// Copy the volume into a sampling structure
    pub fn upload_volume(&self, n_voxel: [usize; 3], data: &[f32]) -> Result<VolumeTexture> {
        VolumeTexture::upload(n_voxel, data)
    }

    /// Run `kernel` on the device's pool, returning once every group is done
    pub fn launch<R: Send>(&self, name: &str, grid: Grid, kernel: impl FnOnce(Grid) -> R + Send) -> R {
        debug!("launch {name}: {} groups of {} workers", grid.groups, grid.group_size);
        self.device.pool.install(|| kernel(grid))
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        debug!("unbound {:?} from device {}", self.profile, self.device.name);
    }
}

/// Device-resident array
pub struct DeviceBuffer<T> {
    what: &'static str,
    data: Vec<T>,
}

impl<T: Copy + Default> DeviceBuffer<T> {

    fn zeroed(what: &'static str, len: usize) -> Result<Self> {
        let bytes = len.saturating_mul(std::mem::size_of::<T>());
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| ProjectionError::Allocation { what, bytes })?;
        data.resize(len, T::default());
        debug!("allocated {what}: {bytes} bytes");
        Ok(Self { what, data })
    }

    pub fn len(&self) -> usize { self.data.len() }

    pub fn fill(&mut self, value: T) { self.data.fill(value) }

    pub fn as_slice(&self) -> &[T] { &self.data }

    pub fn as_mut_slice(&mut self) -> &mut [T] { &mut self.data }

    /// Copy the whole buffer to the host
    pub fn copy_to(&self, host: &mut [T]) -> Result<()> {
        if host.len() != self.data.len() {
            return Err(ProjectionError::Transfer { what: self.what, expected: self.data.len(), actual: host.len() })
        }
        host.copy_from_slice(&self.data);
        Ok(())
    }
}

impl<T> Drop for DeviceBuffer<T> {
    fn drop(&mut self) {
        debug!("released {}: {} bytes", self.what, self.data.len() * std::mem::size_of::<T>());
    }
}

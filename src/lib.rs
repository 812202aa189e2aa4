pub mod config;
pub mod device;
pub mod error;
pub mod index;
pub mod io;
pub mod projector;
pub mod scanner;
pub mod utils;
pub mod volume;

pub use device::{Device, DeviceLimits, ExecutionProfile};
pub use error::{ProjectionError, Result};
pub use projector::{project, DetectorImage, DetectorPolicy, Projections, Projector};
pub use scanner::Geometry;
pub use volume::Volume;

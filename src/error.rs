//! Failures which abort a projection call.
//!
//! Every variant is fatal to the call in which it occurs: there is no retry and
//! no partial result. Degenerate geometry is *not* an error; it propagates as
//! non-finite detector values.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjectionError {
    /// The device's worker pool could not be created.
    #[error("no usable compute device: {0}")]
    NoDevice(String),

    /// The execution profile does not fit the device.
    #[error("execution profile incompatible with device `{device}`: {reason}")]
    IncompatibleProfile { device: String, reason: String },

    /// A device buffer could not be reserved.
    #[error("failed to allocate {bytes} bytes for {what}")]
    Allocation { what: &'static str, bytes: usize },

    /// Host and device disagree about the size of a transfer.
    #[error("transfer of {what} failed: expected {expected} elements, got {actual}")]
    Transfer { what: &'static str, expected: usize, actual: usize },

    /// A per-angle input does not have one entry per projection angle.
    #[error("{what} has {actual} entries, but there are {expected} angles")]
    AngleCount { what: &'static str, expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, ProjectionError>;

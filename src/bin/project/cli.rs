/// Command line interface for `project` executable
#[derive(clap::Parser, Debug, Clone)]
#[clap(
    name = "project",
    about = "Cone-beam forward projection of a voxelized volume",
)]
pub (super) struct Cli {
    /// TOML file describing scanner geometry and projection angles
    #[clap(short, long)]
    pub config: PathBuf,

    /// Volume densities as raw little-endian f32, x varying fastest
    #[clap(short, long)]
    pub input: PathBuf,

    /// Projections as raw little-endian f64, one detector image per angle
    #[clap(short, long, default_value = "projections.raw")]
    pub output: PathBuf,

    /// Keep the detector contents between angles, rather than resetting them
    #[clap(long)]
    pub accumulate: bool,

    /// Number of workers integrating each ray
    #[clap(short = 'g', long, default_value = "1024")]
    pub group_size: usize,

    /// Number of device threads (0: one per core)
    #[clap(short = 'j', long, default_value = "0")]
    pub threads: usize,
}

impl Cli {
    pub (super) fn policy(&self) -> DetectorPolicy {
        if self.accumulate { DetectorPolicy::Accumulate }
        else               { DetectorPolicy::ResetPerAngle }
    }
}


// ----- Imports -----------------------------------------------------------------------------------------
use std::path::PathBuf;
use conebeam::DetectorPolicy;

mod cli;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Cli::parse();
    let mut progress = Progress::new();

    // Before starting the potentially long computation, make sure that we can
    // write the result to the requested destination.
    if let Some(dir) = args.output.parent() {
        std::fs::create_dir_all(dir)?;
    }

    // --- Geometry and volume -------------------------------------------------------
    progress.start(&format!("Reading {}", args.config.display()));
    let config = read_config_file(&args.config)?;
    let angles = config.angles()?;
    let geometry = config.geometry()?;
    progress.done();

    progress.start(&format!("Reading {}", args.input.display()));
    let volume = Volume::from_raw_file(geometry.n_voxel, &args.input)?;
    progress.done();

    // --- Project -------------------------------------------------------------------
    let device = Device::open(args.threads)?;
    let projector = Projector::new(&device)
        .with_profile(ExecutionProfile::with_group_size(args.group_size))
        .with_policy(args.policy());

    let mut projections = Projections::zeros(geometry.n_detec, angles.len());
    let bar = ProgressBar::new(angles.len() as u64);
    bar.set_style(ProgressStyle::default_bar()
                  .template("Projecting: [{elapsed_precise}] {wide_bar} {pos}/{len} angles ({eta_precise})")?
    );
    progress.startln(&format!("Projecting {} angles", group_digits(angles.len())));
    projector.project_with_progress(
        volume.as_slice(), &geometry, &angles, projections.images_mut(),
        |_| bar.inc(1),
    )?;
    bar.finish();
    progress.done_with_message("Projected");

    // --- Write results -------------------------------------------------------------
    progress.start(&format!("Writing {}", args.output.display()));
    projections.write_to_raw_file(&args.output)?;
    progress.done();
    Ok(())
}

// ----- Imports -----------------------------------------------------------------------------------------
use std::error::Error;
use clap::Parser;
use env_logger::Env;
use indicatif::{ProgressBar, ProgressStyle};
use cli::Cli;
use conebeam::{
    config::read_config_file,
    utils::{group_digits, timing::Progress},
    Device, ExecutionProfile, Projections, Projector, Volume,
};

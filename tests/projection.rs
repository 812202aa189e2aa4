// End-to-end forward projections of small volumes with known line integrals

use conebeam::{
    index::pixel_to_slot,
    DetectorPolicy, Device, DeviceLimits, ExecutionProfile, Geometry, ProjectionError, Projector, Volume,
};
use float_eq::assert_float_eq;
use geometry::{Cuboid, Point3D};
use rstest::rstest;

const DSO: f32 = 100.0;
const DSD: f32 = 150.0;

/// `n`^3 voxels of 1 mm, seen by a detector of unit pixels
fn cube(n: usize, n_detec: [usize; 2], n_angles: usize) -> Geometry {
    let s = n as f32;
    Geometry::new([n, n, n], [s, s, s], n_detec, [1.0, 1.0], DSO, DSD)
        .with_uniform_offsets(n_angles, [0.0, 0.0], [0.0, 0.0, 0.0])
}

fn device() -> Device { Device::open(2).unwrap() }

// ----- The 4x4x4 unit cube ---------------------------------------------------------------
#[test]
fn unit_cube_regression() -> Result<(), ProjectionError> {
    let geometry = cube(4, [4, 4], 2);
    let volume = Volume::uniform([4, 4, 4], 1.0);
    let device = device();
    let projections = Projector::new(&device)
        .project(volume.as_slice(), &geometry, &[0.0, std::f64::consts::FRAC_PI_2])?;
    assert_eq!(projections.n_angles(), 2);
    for image in projections.images() {
        assert_eq!(image.len(), 16);
        for &pixel in image {
            assert_float_eq!(pixel, 4.0, abs <= 0.1);
        }
    }
    Ok(())
}

#[rstest(/**/ off_u, expected,
         // Through the middle
         case(0.0  , 4.0),
         // Through the outermost row of voxels, a quarter voxel from its edge
         case(2.625, 3.0),
)]
fn single_ray(off_u: f32, expected: f64) -> Result<(), ProjectionError> {
    let geometry = cube(4, [1, 1], 1).with_uniform_offsets(1, [off_u, 0.0], [0.0, 0.0, 0.0]);
    let projections = conebeam::project(&[1.0; 64], &geometry, &[0.0])?;
    assert_float_eq!(projections.image(0)[0], expected, abs <= 0.1);
    Ok(())
}

#[rstest(/**/ off_u, off_v,
         case( 10.0,   0.0),
         case(-10.0,   0.0),
         case(  0.0,  12.0),
)]
fn ray_missing_volume_contributes_nothing(off_u: f32, off_v: f32) -> Result<(), ProjectionError> {
    let geometry = cube(4, [1, 1], 1).with_uniform_offsets(1, [off_u, off_v], [0.0, 0.0, 0.0]);
    let projections = conebeam::project(&[1.0; 64], &geometry, &[0.0])?;
    assert_eq!(projections.image(0)[0], 0.0);
    Ok(())
}

// ----- Uniform volumes integrate to density times path length ---------------------------
#[rstest(/**/ alpha, accuracy, tolerance,
         case(0.0, 0.5 , 0.3 ),
         case(0.3, 0.5 , 0.3 ),
         case(0.3, 0.25, 0.1 ),
         case(1.9, 0.1 , 0.05),
)]
fn uniform_volume_gives_density_times_chord(alpha: f32, accuracy: f32, tolerance: f64) -> Result<(), ProjectionError> {
    let density = 2.0;
    let n = 16;
    let geometry = cube(n, [4, 4], 1).with_accuracy(accuracy);
    let volume = Volume::uniform([n, n, n], density);
    let device = device();
    let projections = Projector::new(&device).project(volume.as_slice(), &geometry, &[alpha as f64])?;

    let bounds = Cuboid::new(Point3D::ZERO, geometry.s_voxel);
    let source = Point3D::new(DSO, 0.0, 0.0).rotate_z(alpha);
    for u in 0..4 {
        for v in 0..4 {
            let y = u as f32 - 1.5;
            let z = 1.5 - v as f32;
            let pixel = Point3D::new(DSO - DSD, y, z).rotate_z(alpha);
            let expected = density as f64 * bounds.chord(source, pixel) as f64;
            assert_float_eq!(projections.pixel(0, [u, v]), expected, abs <= tolerance);
        }
    }
    Ok(())
}

#[test]
fn line_integral_is_linear_in_density() -> Result<(), ProjectionError> {
    let geometry = cube(6, [3, 3], 1).with_uniform_offsets(1, [0.4, -0.3], [0.5, 0.0, 0.25]);
    let volume = Volume::from_fn([6, 6, 6], |[x, y, z]| (1 + x + 2 * y + 3 * z) as f32 / 10.0);
    let doubled: Vec<f32> = volume.as_slice().iter().map(|d| 2.0 * d).collect();
    let one = conebeam::project(volume.as_slice(), &geometry, &[0.8])?;
    let two = conebeam::project(&doubled, &geometry, &[0.8])?;
    for (a, b) in one.image(0).iter().zip(two.image(0)) {
        assert_float_eq!(2.0 * a, *b, rmax <= 1e-5);
    }
    Ok(())
}

// ----- Detector layout -----------------------------------------------------------------
#[test]
fn top_row_is_stored_last_in_its_column() -> Result<(), ProjectionError> {
    // Density only in the upper half of the volume
    let volume = Volume::from_fn([4, 4, 4], |[_, _, z]| if z >= 2 { 1.0 } else { 0.0 });
    let geometry = cube(4, [1, 4], 1);
    let projections = conebeam::project(volume.as_slice(), &geometry, &[0.0])?;
    let image = projections.image(0);
    // Slot 3 holds the top row, slot 0 the bottom row
    assert_float_eq!(image[3], 4.0, abs <= 0.1);
    assert_eq!(image[0], 0.0);
    assert!(image[3] > image[2] && image[2] > image[1] && image[1] > image[0], "{image:?}");
    assert_eq!(projections.pixel(0, [0, 0]), image[3]);
    assert_eq!(projections.pixel(0, [0, 3]), image[0]);
    Ok(())
}

#[test]
fn mirrored_rows_of_z_symmetric_volume_agree() -> Result<(), ProjectionError> {
    let [nx, ny, nz] = [5, 6, 6];
    let volume = Volume::from_fn([nx, ny, nz], |[x, y, z]| {
        let dz = (2 * z as i32 - (nz as i32 - 1)).abs();
        (1 + x + y) as f32 * (1.0 + dz as f32)
    });
    let (nu, nv) = (3, 5);
    let geometry = Geometry::new([nx, ny, nz], [5.0, 6.0, 6.0], [nu, nv], [1.0, 0.8], DSO, DSD)
        .with_uniform_offsets(1, [0.0, 0.0], [0.0, 0.0, 0.0]);
    let projections = conebeam::project(volume.as_slice(), &geometry, &[0.6])?;
    for u in 0..nu {
        for v in 0..nv / 2 {
            let top    = projections.pixel(0, [u, v]);
            let bottom = projections.pixel(0, [u, nv - 1 - v]);
            assert_float_eq!(top, bottom, rmax <= 1e-5);
        }
    }
    Ok(())
}

// ----- Repeatability and cross-angle behaviour -----------------------------------------
#[test]
fn identical_calls_give_identical_results() -> Result<(), ProjectionError> {
    let geometry = cube(5, [4, 3], 3);
    let volume = Volume::from_fn([5, 5, 5], |[x, y, z]| (x * y + z) as f32);
    let angles = [0.0, 1.0, 2.0];
    let device = device();
    let projector = Projector::new(&device);
    let a = projector.project(volume.as_slice(), &geometry, &angles)?;
    let b = projector.project(volume.as_slice(), &geometry, &angles)?;
    assert_eq!(a, b);
    Ok(())
}

fn single_angle_images(volume: &Volume, angles: &[f64], profile: ExecutionProfile) -> Vec<Vec<f64>> {
    let device = device();
    let projector = Projector::new(&device).with_profile(profile);
    angles.iter()
        .map(|&alpha| projector
             .project(volume.as_slice(), &cube(4, [3, 2], 1), &[alpha])
             .unwrap()
             .into_images()
             .remove(0))
        .collect()
}

#[test]
fn reset_per_angle_keeps_angles_independent() -> Result<(), ProjectionError> {
    let volume = Volume::from_fn([4, 4, 4], |[x, _, z]| (x + z) as f32);
    let angles = [0.0, 0.7, 1.4];
    let profile = ExecutionProfile::with_group_size(128);
    let singles = single_angle_images(&volume, &angles, profile);

    let device = device();
    let projections = Projector::new(&device)
        .with_profile(profile)
        .with_policy(DetectorPolicy::ResetPerAngle)
        .project(volume.as_slice(), &cube(4, [3, 2], 3), &angles)?;
    assert_eq!(projections.images(), &singles[..]);
    Ok(())
}

#[test]
fn accumulate_adds_each_angle_to_previous_ones() -> Result<(), ProjectionError> {
    let volume = Volume::from_fn([4, 4, 4], |[x, _, z]| (x + z) as f32);
    let angles = [0.0, 0.7, 1.4];
    let profile = ExecutionProfile::with_group_size(128);
    let singles = single_angle_images(&volume, &angles, profile);

    let device = device();
    let projections = Projector::new(&device)
        .with_profile(profile)
        .with_policy(DetectorPolicy::Accumulate)
        .project(volume.as_slice(), &cube(4, [3, 2], 3), &angles)?;
    assert_eq!(projections.image(0), &singles[0][..]);
    for k in 1..angles.len() {
        for slot in 0..6 {
            assert_float_eq!(
                projections.image(k)[slot],
                projections.image(k - 1)[slot] + singles[k][slot],
                abs <= 1e-12
            );
        }
    }
    Ok(())
}

// ----- Fatal conditions ------------------------------------------------------------------
#[test]
fn offsets_must_cover_every_angle() {
    let geometry = cube(4, [2, 2], 1);
    let result = conebeam::project(&[1.0; 64], &geometry, &[0.0, 1.0]);
    assert!(matches!(result, Err(ProjectionError::AngleCount { expected: 2, actual: 1, .. })));
}

#[test]
fn volume_must_match_geometry() {
    let geometry = cube(4, [2, 2], 1);
    let result = conebeam::project(&[1.0; 63], &geometry, &[0.0]);
    assert!(matches!(result, Err(ProjectionError::Transfer { what: "volume", expected: 64, actual: 63 })));
}

#[rstest(/**/ group_size, case(48), case(4096))]
fn incompatible_profile_is_fatal(group_size: usize) {
    let device = device();
    let result = Projector::new(&device)
        .with_profile(ExecutionProfile::with_group_size(group_size))
        .project(&[1.0; 64], &cube(4, [2, 2], 1), &[0.0]);
    assert!(matches!(result, Err(ProjectionError::IncompatibleProfile { .. })));
}

#[test]
fn device_with_little_shared_memory_refuses_default_profile() {
    let limits = DeviceLimits { max_group_size: 1024, shared_memory_bytes: 1024, concurrent_groups: 1 };
    let device = device().with_limits(limits);
    let result = Projector::new(&device).project(&[1.0; 64], &cube(4, [2, 2], 1), &[0.0]);
    assert!(matches!(result, Err(ProjectionError::IncompatibleProfile { .. })));
    // A smaller group fits: 64 * 8 + 20 bytes
    let projections = Projector::new(&device)
        .with_profile(ExecutionProfile::with_group_size(64))
        .project(&[1.0; 64], &cube(4, [2, 2], 1), &[0.0])
        .unwrap();
    assert_eq!(projections.n_detec(), [2, 2]);
    assert_eq!(projections.image(0).len(), pixel_to_slot([1, 0], 2) + 1);
}

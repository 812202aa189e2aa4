//! Per-angle transformation of the scanner geometry into the ray-casting frame.
//!
//! In the ray-casting frame, lengths are measured in voxels along each axis,
//! and voxel `(i, j, k)` is centred on the point `(i, j, k)`. Every quantity in
//! a `RayFrame` is expressed in this frame.

use geometry::Point3D;
use units::plain::Voxelsf32;

use crate::scanner::Geometry;

/// Source and detector position for one projection angle
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayFrame {
    pub source: Point3D,
    /// Centre of detector pixel `(0, 0)`
    pub uv_origin: Point3D,
    /// Displacement from one pixel centre to the next, along U
    pub delta_u: Point3D,
    /// Displacement from one pixel centre to the next, along V
    pub delta_v: Point3D,
    /// Number of samples along each ray which may be skipped, as they lie
    /// before the ray can possibly reach the volume
    pub max_dist: Voxelsf32,
}

/// Build the ray frame for angle number `i`, whose value is in `geo.alpha`
pub fn compute_deltas(geo: &Geometry, i: usize) -> RayFrame {
    let [nu, nv] = geo.n_detec;
    let [du, dv] = geo.d_detec;
    let (nu, nv) = (nu as f32, nv as f32);
    let x_detector = -(geo.dsd - geo.dso);

    // Centre of pixel (u, v) in the unrotated scanner frame
    let pixel = |u: f32, v: f32| Point3D::new(
        x_detector,
        du * (u - nu / 2.0 + 0.5) + geo.off_detec_u[i],
        dv * (nv / 2.0 - 0.5 - v) + geo.off_detec_v[i],
    );

    let origin_offset = Point3D::new(geo.off_orig_x[i], geo.off_orig_y[i], geo.off_orig_z[i]);
    let corner_to_centre = Point3D::from_array([
        geo.s_voxel[0] / 2.0 - geo.d_voxel[0] / 2.0,
        geo.s_voxel[1] / 2.0 - geo.d_voxel[1] / 2.0,
        geo.s_voxel[2] / 2.0 - geo.d_voxel[2] / 2.0,
    ]);
    let to_voxel_frame = |p: Point3D| {
        (p.rotate_z(geo.alpha) - origin_offset + corner_to_centre).component_div(geo.d_voxel)
    };

    let source = to_voxel_frame(Point3D::new(geo.dso, 0.0, 0.0));
    let p      = to_voxel_frame(pixel(0.0, 0.0));
    let pu0    = to_voxel_frame(pixel(1.0, 0.0));
    let pv0    = to_voxel_frame(pixel(0.0, 1.0));

    RayFrame {
        source,
        uv_origin: p,
        delta_u: pu0 - p,
        delta_v: pv0 - p,
        max_dist: max_distance_cube_xy(geo, i),
    }
}

/// Distance from the source to the cylinder (about the rotation axis) which
/// encloses the shifted volume in the xy-plane, in units of x-voxels. The
/// z-extent is not considered.
pub fn max_distance_cube_xy(geo: &Geometry, i: usize) -> Voxelsf32 {
    let max_cub_x = (geo.s_voxel[0] / 2.0 + geo.off_orig_x[i].abs()) / geo.d_voxel[0];
    let max_cub_y = (geo.s_voxel[1] / 2.0 + geo.off_orig_y[i].abs()) / geo.d_voxel[1];
    geo.dso / geo.d_voxel[0] - (max_cub_x * max_cub_x + max_cub_y * max_cub_y).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;
    use rstest::rstest;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn close(a: Point3D, b: Point3D) {
        assert_float_eq!(a.to_array(), b.to_array(), abs_all <= 1e-4);
    }

    fn geometry() -> Geometry {
        Geometry::new([4, 4, 4], [4.0, 4.0, 4.0], [4, 4], [1.0, 1.0], 100.0, 150.0)
            .with_uniform_offsets(1, [0.0, 0.0], [0.0, 0.0, 0.0])
    }

    #[test]
    fn unrotated_frame() {
        let frame = compute_deltas(&geometry(), 0);
        close(frame.source,    Point3D::new( 101.5,  1.5, 1.5));
        close(frame.uv_origin, Point3D::new( -48.5,  0.0, 3.0));
        close(frame.delta_u,   Point3D::new(   0.0,  1.0, 0.0));
        close(frame.delta_v,   Point3D::new(   0.0,  0.0,-1.0));
    }

    #[test]
    fn quarter_turn_moves_source_to_y_axis() {
        let mut geo = geometry();
        geo.alpha = FRAC_PI_2;
        let frame = compute_deltas(&geo, 0);
        close(frame.source,  Point3D::new(1.5, 101.5, 1.5));
        close(frame.delta_u, Point3D::new(-1.0,  0.0, 0.0));
        close(frame.delta_v, Point3D::new( 0.0,  0.0,-1.0));
        // The skip distance does not depend on the angle
        assert_eq!(frame.max_dist, compute_deltas(&geometry(), 0).max_dist);
    }

    #[test]
    fn half_turn_mirrors_source() {
        let mut geo = geometry();
        geo.alpha = PI;
        let frame = compute_deltas(&geo, 0);
        close(frame.source,    Point3D::new(-98.5, 1.5, 1.5));
        close(frame.uv_origin, Point3D::new( 51.5, 3.0, 3.0));
    }

    #[test]
    fn anisotropic_voxels_scale_each_axis() {
        let geo = Geometry::new([4, 2, 8], [4.0, 4.0, 4.0], [2, 2], [1.0, 1.0], 100.0, 150.0)
            .with_uniform_offsets(1, [0.0, 0.0], [0.0, 0.0, 0.0]);
        let frame = compute_deltas(&geo, 0);
        // d_voxel = [1, 2, 0.5]
        close(frame.source,  Point3D::new(101.5, 0.5, 3.5));
        close(frame.delta_u, Point3D::new(  0.0, 0.5, 0.0));
        close(frame.delta_v, Point3D::new(  0.0, 0.0,-2.0));
    }

    #[test]
    fn offsets_shift_detector_and_volume() {
        let geo = geometry().with_uniform_offsets(1, [2.0, -3.0], [1.0, 0.5, 0.25]);
        let shifted = compute_deltas(&geo, 0);
        let plain   = compute_deltas(&geometry(), 0);
        // Moving the volume by +o is the same as moving the scanner by -o
        close(shifted.source,    plain.source    - Point3D::new(1.0, 0.5, 0.25));
        close(shifted.uv_origin, plain.uv_origin + Point3D::new(-1.0, 1.5, -3.25));
        close(shifted.delta_u,   plain.delta_u);
        close(shifted.delta_v,   plain.delta_v);
    }

    #[test]
    fn offsets_are_taken_from_the_given_angle() {
        let mut geo = geometry().with_uniform_offsets(2, [0.0, 0.0], [0.0, 0.0, 0.0]);
        geo.off_detec_u[1] = 5.0;
        let a = compute_deltas(&geo, 0);
        let b = compute_deltas(&geo, 1);
        close(b.uv_origin - a.uv_origin, Point3D::new(0.0, 5.0, 0.0));
    }

    #[rstest(/**/ off_x, off_y, expected,
             case( 0.0,   0.0,  100.0 - 8.0_f32.sqrt()),
             case( 2.0,   0.0,  100.0 - 20.0_f32.sqrt()),
             case(-2.0,   0.0,  100.0 - 20.0_f32.sqrt()),
             case( 1.0,  -2.0,  100.0 - 25.0_f32.sqrt()),
    )]
    fn max_distance(off_x: f32, off_y: f32, expected: f32) {
        let geo = geometry().with_uniform_offsets(1, [0.0, 0.0], [off_x, off_y, 7.0]);
        assert_float_eq!(max_distance_cube_xy(&geo, 0), expected, abs <= 1e-4);
    }

    #[test]
    fn max_distance_in_x_voxels() {
        let geo = Geometry::new([8, 4, 4], [4.0, 4.0, 4.0], [1, 1], [1.0, 1.0], 100.0, 150.0)
            .with_uniform_offsets(1, [0.0, 0.0], [0.0, 0.0, 0.0]);
        // d_voxel x = 0.5: 200 - sqrt(4^2 + 2^2)
        assert_float_eq!(max_distance_cube_xy(&geo, 0), 200.0 - 20.0_f32.sqrt(), abs <= 1e-3);
    }
}

//! Pinhole re-projection and pixel-error metrics.

use matcal_core::{Iso3, Mat3, Pt2, Pt3, Real};

/// Project world points into pixels under the pose `cam_from_world` (`T_C_W`)
/// and intrinsics `kmtx`.
///
/// Points that land on the camera plane (`z ≈ 0`) project to infinity; the
/// caller feeds points that sit in front of the camera.
pub fn project_points(world: &[Pt3], cam_from_world: &Iso3, kmtx: &Mat3) -> Vec<Pt2> {
    world
        .iter()
        .map(|p| {
            let pc = cam_from_world.transform_point(p);
            let uvw = kmtx * pc.coords;
            Pt2::new(uvw.x / uvw.z, uvw.y / uvw.z)
        })
        .collect()
}

/// Mean squared pixel error of `observed` against the re-projection of
/// `world` under `cam_from_world`.
///
/// The error is aggregated over all correspondences (mean of squared pixel
/// distances); returns 0 for empty input.
pub fn mean_squared_pixel_error(
    world: &[Pt3],
    observed: &[Pt2],
    cam_from_world: &Iso3,
    kmtx: &Mat3,
) -> Real {
    if world.is_empty() {
        return 0.0;
    }

    let projected = project_points(world, cam_from_world, kmtx);
    let sum: Real = projected
        .iter()
        .zip(observed.iter())
        .map(|(p, o)| {
            let dx = o.x - p.x;
            let dy = o.y - p.y;
            dx * dx + dy * dy
        })
        .sum();

    sum / world.len() as Real
}

//! Per-tracker extrinsic pose solving.
//!
//! The perspective-pose solve itself is an external capability consumed
//! through [`PerspectivePoseSolver`]; any PnP-class algorithm satisfying the
//! contract can be plugged in. [`PlanarMatSolver`] is the default, backed by
//! the coplanar direct solve in `matcal-linear`.

use log::debug;
use matcal_core::{mat_locations, Iso3, Mat3, Pt2, Pt3, Real, TrackerIntrinsics, MAT_LOCATION_COUNT};

/// External perspective-pose solver contract.
///
/// `solve` recovers the camera pose from 3D points and their observed 2D
/// projections, returning `T_C_W` (world into camera frame) or `None` when
/// no consistent pose exists (degenerate or collinear geometry,
/// insufficient correspondences). `reproject` maps object points back into
/// pixels under a solved pose. Lens distortion is not modeled: the session
/// feeds undistorted pixel observations.
pub trait PerspectivePoseSolver {
    /// Solve for the camera pose, or `None` on failure.
    fn solve(&self, object: &[Pt3], image: &[Pt2], kmtx: &Mat3) -> Option<Iso3>;

    /// Project `object` into pixels under `cam_from_world`.
    fn reproject(&self, object: &[Pt3], cam_from_world: &Iso3, kmtx: &Mat3) -> Vec<Pt2>;
}

/// Default solver: homography + planar decomposition over the coplanar mat
/// points.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanarMatSolver;

impl PerspectivePoseSolver for PlanarMatSolver {
    fn solve(&self, object: &[Pt3], image: &[Pt2], kmtx: &Mat3) -> Option<Iso3> {
        match matcal_linear::planar_pnp(object, image, kmtx) {
            Ok(pose) => Some(pose),
            Err(e) => {
                debug!("planar pnp failed: {e:#}");
                None
            }
        }
    }

    fn reproject(&self, object: &[Pt3], cam_from_world: &Iso3, kmtx: &Mat3) -> Vec<Pt2> {
        matcal_linear::project_points(object, cam_from_world, kmtx)
    }
}

/// Result of one tracker's extrinsic solve.
#[derive(Debug, Clone, Copy)]
pub struct TrackerPoseEstimate {
    /// The tracker's pose in controller-tracking space (camera-in-world).
    pub tracker_pose: Iso3,
    /// The tracker's pose relative to the head-reference camera.
    pub head_relative_pose: Iso3,
    /// Mean squared pixel error across the five correspondences.
    pub reprojection_error: Real,
}

/// Solve one tracker's extrinsic pose from its five averaged observations.
///
/// The y pixel coordinate is flipped (`height − y`) before the solve: the
/// observation pipeline's vertical axis runs opposite to the solver's
/// convention. The solver returns the world→camera mapping; the stored
/// tracker pose is its inverse (camera location in controller-tracking
/// space). The relative pose pre-multiplies the composed
/// controller→head-camera transform.
///
/// Returns `None` when the solver finds no pose.
pub fn solve_tracker_pose(
    solver: &dyn PerspectivePoseSolver,
    intrinsics: &TrackerIntrinsics,
    averaged: &[Pt2; MAT_LOCATION_COUNT],
    controller_to_head_camera: &Iso3,
) -> Option<TrackerPoseEstimate> {
    let object: Vec<Pt3> = mat_locations().to_vec();
    let image: Vec<Pt2> = averaged
        .iter()
        .map(|p| Pt2::new(p.x, intrinsics.height - p.y))
        .collect();
    let kmtx = intrinsics.k_matrix();

    let cam_from_world = solver.solve(&object, &image, &kmtx)?;

    // Error across all five correspondences: mean of squared pixel errors.
    let projected = solver.reproject(&object, &cam_from_world, &kmtx);
    let mut error_sum = 0.0;
    for (obs, proj) in image.iter().zip(projected.iter()) {
        let dx = obs.x - proj.x;
        let dy = obs.y - proj.y;
        error_sum += dx * dx + dy * dy;
    }
    let reprojection_error = error_sum / MAT_LOCATION_COUNT as Real;

    let tracker_pose = cam_from_world.inverse();
    let head_relative_pose = controller_to_head_camera * tracker_pose;

    debug!(
        "tracker pose solved: reproj_err={reprojection_error:.4}px², t=({:.1}, {:.1}, {:.1})",
        tracker_pose.translation.x, tracker_pose.translation.y, tracker_pose.translation.z
    );

    Some(TrackerPoseEstimate {
        tracker_pose,
        head_relative_pose,
        reprojection_error,
    })
}

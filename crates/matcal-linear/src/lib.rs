//! Linear geometry for mat calibration.
//!
//! The calibration mat's five sample locations are coplanar (all at bulb
//! height above the mat surface), so the camera-pose-from-correspondences
//! problem is solved directly:
//! 1. map the 3D points into 2D plane coordinates,
//! 2. estimate the plane→image homography via DLT ([`dlt_homography`]),
//! 3. decompose the homography into a rigid pose given the intrinsics
//!    ([`pose_from_homography`]),
//! 4. chain the plane frame back into the world frame ([`planar_pnp`]).
//!
//! All poses are `T_C_W`: the transform from world coordinates into the
//! camera frame. Re-projection utilities live in [`reproject`].

mod homography;
mod planar_pose;
mod pnp;
/// Point re-projection and pixel-error metrics.
pub mod reproject;

pub use homography::{dlt_homography, HomographyError};
pub use planar_pose::pose_from_homography;
pub use pnp::planar_pnp;
pub use reproject::{mean_squared_pixel_error, project_points};

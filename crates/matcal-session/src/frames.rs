//! Coordinate frame composition.
//!
//! Frames involved (see the workspace convention in `matcal_core::math`):
//! - *controller-tracking space*: where the optical trackers report the
//!   controller and, eventually, their own calibrated poses;
//! - *calibration-origin space*: the mat's own frame, usually coincident
//!   with controller-tracking space;
//! - *head tracking space*: where the head-reference device reports poses;
//! - *head camera space*: relative to the head device's tracking camera.

use matcal_core::{iso_from_pose, Iso3, Pt3, Quat};

/// Compose the transform mapping controller-tracking space into head-camera
/// space.
///
/// Inputs:
/// - `camera_in_head_tracking`: the head tracking camera's pose in head
///   tracking space (from the head device's own tracking output);
/// - `head_avg_position` / `head_avg_orientation`: the head pose averaged
///   while the controller sat at the calibration origin, i.e. the
///   calibration origin as seen in head tracking space;
/// - `origin_in_controller_tracking`: where the mat origin sits in
///   controller-tracking space (identity unless the mat is offset).
///
/// The composition applies the innermost conversion first:
/// tracking→origin, origin→head-tracking, head-tracking→head-camera.
/// Degenerate inputs are not detected here; they propagate as a degenerate
/// transform.
pub fn controller_to_head_camera(
    camera_in_head_tracking: &Iso3,
    head_avg_position: &Pt3,
    head_avg_orientation: &Quat,
    origin_in_controller_tracking: &Iso3,
) -> Iso3 {
    let head_tracking_to_camera = camera_in_head_tracking.inverse();
    let origin_in_head_tracking = iso_from_pose(head_avg_orientation, head_avg_position);
    let tracking_to_origin = origin_in_controller_tracking.inverse();

    head_tracking_to_camera * origin_in_head_tracking * tracking_to_origin
}

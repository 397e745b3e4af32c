//! Collaborator traits implemented by the hosting application.
//!
//! The session core never talks to tracking hardware; it consumes
//! already-decoded pose and pixel observations through these contracts and
//! hands calibrated poses back through [`TrackerPoseSink`].

use matcal_core::{Iso3, Pt2, Pt3, Quat, TrackerIntrinsics};

/// Live status of the handheld controller.
pub trait ControllerStatus {
    /// True while the controller is motionless and upright (gravity-aligned).
    fn is_stable_and_gravity_aligned(&self) -> bool;

    /// True while at least one tracker currently sees the controller.
    fn is_currently_tracked(&self) -> bool;

    /// The controller's pixel location on the given tracker's image, if that
    /// tracker currently observes it.
    fn pixel_location_on_tracker(&self, tracker_id: usize) -> Option<Pt2>;
}

/// Live status of the head-mounted reference device.
pub trait HeadReference {
    /// True while the head device is motionless and upright.
    fn is_stable_and_gravity_aligned(&self) -> bool;

    /// True while the head device's own tracking system has a fix.
    fn is_tracking(&self) -> bool;

    /// The head device's pose in head tracking space.
    fn current_pose(&self) -> (Pt3, Quat);

    /// Pose of the head tracking camera in head tracking space.
    fn camera_to_tracking_pose(&self) -> Iso3;
}

/// The externally owned collection of fixed optical trackers.
///
/// Trackers are identified by a stable index in `0..tracker_count()`.
pub trait TrackerProvider {
    /// Number of configured trackers.
    fn tracker_count(&self) -> usize;

    /// Intrinsics of the tracker at `tracker_id`.
    fn intrinsics(&self, tracker_id: usize) -> TrackerIntrinsics;
}

/// Receives the calibrated poses once every tracker has solved.
pub trait TrackerPoseSink {
    /// Deliver one tracker's calibrated extrinsic: its pose in
    /// controller-tracking space and its pose relative to the head-reference
    /// camera.
    fn report_tracker_pose(&mut self, tracker_id: usize, pose: &Iso3, relative_pose: &Iso3);
}

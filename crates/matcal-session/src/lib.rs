//! Guided calibration session for optical tracker poses.
//!
//! An operator moves a handheld controller across the five marked locations
//! of a calibration mat, then (optionally) rests the head-mounted reference
//! device at the mat origin. From the accumulated observations the session
//! solves each fixed tracker's extrinsic pose and re-expresses it relative
//! to the head-reference camera.
//!
//! The session advances one discrete step per [`CalibrationSession::tick`]
//! call; nothing blocks internally and no error crosses the tick boundary:
//! every failure mode is a state transition or a validity flag.
//!
//! Module map:
//! - [`stability`]: dwell timing on a per-tick stability signal,
//! - [`samples`]: per-tracker 2D and head 3D sample buffers with averaging,
//! - [`frames`]: controller-tracking to head-camera frame composition,
//! - [`solve`]: per-tracker extrinsic solve over the external PnP contract,
//! - [`devices`]: collaborator traits the host application implements,
//! - [`session`]: the state machine tying it all together.

/// Session configuration and named defaults.
pub mod config;
/// External collaborator traits.
pub mod devices;
/// Coordinate frame composition.
pub mod frames;
/// Sample buffers and averaging.
pub mod samples;
/// The calibration state machine.
pub mod session;
/// Per-tracker pose solving.
pub mod solve;
/// Stability dwell detection.
pub mod stability;

pub use config::{SessionConfig, DEFAULT_DWELL_MS, DEFAULT_SAMPLES_PER_LOCATION};
pub use devices::{ControllerStatus, HeadReference, TrackerPoseSink, TrackerProvider};
pub use frames::controller_to_head_camera;
pub use samples::{HeadSampleSet, SampleAccumulator, TrackerSampleSet};
pub use session::{
    CalibrationReport, CalibrationSession, CalibrationStep, SessionStatus, TrackerProgress,
    TrackerReport,
};
pub use solve::{solve_tracker_pose, PerspectivePoseSolver, PlanarMatSolver, TrackerPoseEstimate};
pub use stability::StabilityDetector;

//! The calibration session state machine.
//!
//! One [`CalibrationSession::tick`] call advances the machine one discrete
//! step. The procedure:
//!
//! ```text
//! Initial → PlaceController → RecordController  (× 5 mat locations)
//!                 ↑ ______________ |
//!         → PlaceHead → RecordHead              (skipped without a head device)
//!         → ComputePoses → Success | Failed
//! ```
//!
//! Transient instability never fails the session, it only routes back to the
//! matching placement step; the only terminal failure is a pose solve that
//! finds no solution. Terminal states are left via [`CalibrationSession::restart`].

use std::time::{Duration, Instant};

use log::{debug, info};
use matcal_core::{Iso3, Real, MAT_LOCATION_COUNT, MAT_LOCATION_LABELS};
use serde::{Deserialize, Serialize};

use crate::config::SessionConfig;
use crate::devices::{ControllerStatus, HeadReference, TrackerPoseSink, TrackerProvider};
use crate::frames::controller_to_head_camera;
use crate::samples::SampleAccumulator;
use crate::solve::{solve_tracker_pose, PerspectivePoseSolver, PlanarMatSolver};
use crate::stability::StabilityDetector;

/// Steps of the calibration procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalibrationStep {
    /// Not yet started; the next tick performs a full reset and begins.
    Initial,
    /// Waiting for the controller to rest stably on the current mat location.
    PlaceController,
    /// Accumulating 2D samples at the current mat location.
    RecordController,
    /// Waiting for the head device to rest stably at the calibration origin.
    PlaceHead,
    /// Accumulating head pose samples.
    RecordHead,
    /// Solving tracker poses from the accumulated averages.
    ComputePoses,
    /// All tracker poses solved and reported. Terminal.
    Success,
    /// At least one pose solve failed; nothing was reported. Terminal.
    Failed,
}

/// Per-tracker sampling progress, for presentation layers.
#[derive(Debug, Clone, Serialize)]
pub struct TrackerProgress {
    /// Stable tracker index.
    pub tracker_id: usize,
    /// Raw samples buffered at the current location.
    pub sample_count: usize,
    /// Whether the current location has its averaged point.
    pub complete: bool,
}

/// Poll-only view of the session, enough to render instructions and progress.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    /// Current step.
    pub step: CalibrationStep,
    /// Whether the relevant stability signal currently holds.
    pub is_stable: bool,
    /// How long the stability signal has held.
    pub stable_for: Option<Duration>,
    /// Configured dwell threshold.
    pub dwell: Duration,
    /// Index of the mat location being sampled (0-based).
    pub location_index: usize,
    /// Operator-facing label of that location.
    pub location_label: String,
    /// Configured samples per location.
    pub samples_per_location: usize,
    /// Per-tracker progress at the current location.
    pub trackers: Vec<TrackerProgress>,
    /// Head pose samples buffered so far.
    pub head_samples: usize,
}

/// One tracker's calibrated result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerReport {
    /// Stable tracker index.
    pub tracker_id: usize,
    /// Pose in controller-tracking space.
    pub tracker_pose: Iso3,
    /// Pose relative to the head-reference camera.
    pub head_relative_pose: Iso3,
    /// Mean squared pixel error across the five correspondences.
    pub reprojection_error: Real,
}

/// Summary of a successful calibration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationReport {
    /// One entry per configured tracker.
    pub trackers: Vec<TrackerReport>,
}

/// The top-level calibration session.
///
/// Owns all per-run state ([`SampleAccumulator`], [`StabilityDetector`],
/// the current step and mat location) and drives it from live device
/// signals, one tick per rendered frame. The tracker collection is injected
/// at construction; controller, head device and pose sink are passed per
/// tick since they belong to the host's frame loop.
pub struct CalibrationSession<P: TrackerProvider> {
    trackers: P,
    config: SessionConfig,
    solver: Box<dyn PerspectivePoseSolver>,
    step: CalibrationStep,
    stability: StabilityDetector,
    samples: SampleAccumulator,
    location_index: usize,
}

impl<P: TrackerProvider> CalibrationSession<P> {
    /// Session over `trackers` with the default planar mat solver.
    pub fn new(trackers: P, config: SessionConfig) -> Self {
        Self::with_solver(trackers, config, Box::new(PlanarMatSolver))
    }

    /// Session with a custom perspective-pose solver.
    pub fn with_solver(
        trackers: P,
        config: SessionConfig,
        solver: Box<dyn PerspectivePoseSolver>,
    ) -> Self {
        let samples = SampleAccumulator::new(trackers.tracker_count(), config.samples_per_location);
        Self {
            stability: StabilityDetector::new(config.dwell),
            samples,
            trackers,
            config,
            solver,
            step: CalibrationStep::Initial,
            location_index: 0,
        }
    }

    /// Current step.
    pub fn step(&self) -> CalibrationStep {
        self.step
    }

    /// Read access to the accumulated samples.
    pub fn samples(&self) -> &SampleAccumulator {
        &self.samples
    }

    /// Abandon the current run and start over from `Initial`.
    ///
    /// Valid from any state; clears every sample buffer, the location index
    /// and the stability timer.
    pub fn restart(&mut self) {
        info!("calibration restart requested from {:?}", self.step);
        self.reset_run();
        self.set_step(CalibrationStep::Initial);
    }

    /// Poll-only status snapshot for presentation layers.
    pub fn status(&self, now: Instant) -> SessionStatus {
        let location = self.location_index.min(MAT_LOCATION_COUNT - 1);
        let trackers = (0..self.samples.tracker_count())
            .map(|tracker_id| TrackerProgress {
                tracker_id,
                sample_count: self.samples.tracker(tracker_id).sample_count(),
                complete: self.samples.location_complete(tracker_id, location),
            })
            .collect();

        SessionStatus {
            step: self.step,
            is_stable: self.stability.is_stable(),
            stable_for: self.stability.stable_for(now),
            dwell: self.config.dwell,
            location_index: self.location_index,
            location_label: MAT_LOCATION_LABELS[location].to_string(),
            samples_per_location: self.config.samples_per_location,
            trackers,
            head_samples: self.samples.head().sample_count(),
        }
    }

    /// The per-tracker results, once the session reached `Success`.
    pub fn report(&self) -> Option<CalibrationReport> {
        if self.step != CalibrationStep::Success {
            return None;
        }

        let trackers = (0..self.samples.tracker_count())
            .filter_map(|tracker_id| {
                let set = self.samples.tracker(tracker_id);
                Some(TrackerReport {
                    tracker_id,
                    tracker_pose: set.tracker_pose?,
                    head_relative_pose: set.head_relative_pose?,
                    reprojection_error: set.reprojection_error,
                })
            })
            .collect();

        Some(CalibrationReport { trackers })
    }

    /// Advance the state machine one step.
    ///
    /// `head` is `None` when no head-reference device is configured, which
    /// shortens the procedure (the head steps are skipped and the frame
    /// composition defaults to identity). Calibrated poses are delivered to
    /// `sink` exactly once, on the tick that reaches `Success`.
    pub fn tick(
        &mut self,
        now: Instant,
        controller: &dyn ControllerStatus,
        head: Option<&dyn HeadReference>,
        sink: &mut dyn TrackerPoseSink,
    ) {
        match self.step {
            CalibrationStep::Initial => {
                self.reset_run();
                self.set_step(CalibrationStep::PlaceController);
            }
            CalibrationStep::PlaceController => {
                if self
                    .stability
                    .observe(controller.is_stable_and_gravity_aligned(), now)
                {
                    self.set_step(CalibrationStep::RecordController);
                }
            }
            CalibrationStep::RecordController => {
                self.tick_record_controller(controller, head.is_some());
            }
            CalibrationStep::PlaceHead => match head {
                Some(h) => {
                    if self.stability.observe(h.is_stable_and_gravity_aligned(), now) {
                        self.set_step(CalibrationStep::RecordHead);
                    }
                }
                // Head device went away mid-session: finish without it.
                None => self.set_step(CalibrationStep::ComputePoses),
            },
            CalibrationStep::RecordHead => self.tick_record_head(head),
            CalibrationStep::ComputePoses => self.tick_compute(head, sink),
            CalibrationStep::Success | CalibrationStep::Failed => {}
        }
    }

    fn tick_record_controller(&mut self, controller: &dyn ControllerStatus, has_head: bool) {
        let stable = controller.is_stable_and_gravity_aligned();
        let location = self.location_index;

        if !self.samples.all_complete_at(location) {
            if !stable {
                // Controller moved mid-location: discard this location's
                // partial buffers, earlier completed locations stay intact.
                debug!("controller moved at location {location}, re-placing");
                self.samples.clear_location_buffers();
                self.stability.reset();
                self.set_step(CalibrationStep::PlaceController);
                return;
            }

            if controller.is_currently_tracked() {
                for tracker_id in 0..self.samples.tracker_count() {
                    if self.samples.location_complete(tracker_id, location) {
                        continue;
                    }
                    if let Some(point) = controller.pixel_location_on_tracker(tracker_id) {
                        self.samples.add_screen_sample(tracker_id, location, point);
                    }
                }
            }
        } else if !stable {
            // Sampling here is complete and the controller was picked up.
            self.samples.clear_location_buffers();
            self.stability.reset();
            self.location_index += 1;

            if self.location_index < MAT_LOCATION_COUNT {
                self.set_step(CalibrationStep::PlaceController);
            } else if has_head {
                self.samples.reset_head();
                self.set_step(CalibrationStep::PlaceHead);
            } else {
                self.set_step(CalibrationStep::ComputePoses);
            }
        }
    }

    fn tick_record_head(&mut self, head: Option<&dyn HeadReference>) {
        let Some(h) = head else {
            self.set_step(CalibrationStep::ComputePoses);
            return;
        };

        if !h.is_stable_and_gravity_aligned() {
            // Head moved: the head buffer resets in full, not partially.
            debug!("head device moved during sampling, re-placing");
            self.samples.reset_head();
            self.stability.reset();
            self.set_step(CalibrationStep::PlaceHead);
            return;
        }

        if h.is_tracking() && !self.samples.head().is_full() {
            let (position, orientation) = h.current_pose();
            self.samples.add_head_sample(position, orientation);

            if self.samples.head().is_full() {
                self.set_step(CalibrationStep::ComputePoses);
            }
        }
    }

    fn tick_compute(&mut self, head: Option<&dyn HeadReference>, sink: &mut dyn TrackerPoseSink) {
        let composed = match (head, self.samples.head().average()) {
            (Some(h), Some((position, orientation))) => controller_to_head_camera(
                &h.camera_to_tracking_pose(),
                &position,
                &orientation,
                &self.config.calibration_offset,
            ),
            _ => Iso3::identity(),
        };

        let mut all_valid = true;
        for tracker_id in 0..self.samples.tracker_count() {
            let Some(averaged) = self.samples.tracker(tracker_id).averaged_points() else {
                all_valid = false;
                break;
            };
            let intrinsics = self.trackers.intrinsics(tracker_id);

            match solve_tracker_pose(self.solver.as_ref(), &intrinsics, &averaged, &composed) {
                Some(est) => {
                    let set = self.samples.tracker_mut(tracker_id);
                    set.valid_pose = true;
                    set.reprojection_error = est.reprojection_error;
                    set.tracker_pose = Some(est.tracker_pose);
                    set.head_relative_pose = Some(est.head_relative_pose);
                }
                None => {
                    debug!("pose solve failed for tracker {tracker_id}");
                    self.samples.tracker_mut(tracker_id).valid_pose = false;
                    all_valid = false;
                    break;
                }
            }
        }

        if all_valid {
            for tracker_id in 0..self.samples.tracker_count() {
                let set = self.samples.tracker(tracker_id);
                if let (Some(pose), Some(relative)) = (set.tracker_pose, set.head_relative_pose) {
                    sink.report_tracker_pose(tracker_id, &pose, &relative);
                }
            }
            info!(
                "calibration succeeded for {} tracker(s)",
                self.samples.tracker_count()
            );
            self.set_step(CalibrationStep::Success);
        } else {
            // No partial results: either every tracker reports or none does.
            self.set_step(CalibrationStep::Failed);
        }
    }

    fn reset_run(&mut self) {
        self.samples.reset_all();
        self.location_index = 0;
        self.stability.reset();
    }

    fn set_step(&mut self, step: CalibrationStep) {
        if step != self.step {
            debug!("calibration step {:?} -> {:?}", self.step, step);
            self.step = step;
        }
    }
}

//! Sample buffers and averaging.
//!
//! Two independent responsibilities:
//! - per-tracker buffers of 2D pixel observations of the controller, one
//!   buffer per tracker for the mat location currently being sampled, with
//!   an averaged point stored per completed location;
//! - a single buffer of head-reference (position, orientation) samples taken
//!   while the controller sits at the calibration origin.
//!
//! Buffers are capped: adding to a full buffer is a no-op. Averages are only
//! computed at the moment a buffer fills.

use matcal_core::{
    normalize_or_identity, Iso3, Pt2, Pt3, Quat, RawQuat, Real, Vec3, MAT_LOCATION_COUNT,
};

/// Observation buffers and solve results for one tracker.
#[derive(Debug, Clone)]
pub struct TrackerSampleSet {
    /// Raw pixel samples at the location currently being sampled.
    points: Vec<Pt2>,
    /// Averaged pixel point per completed mat location.
    averaged: [Option<Pt2>; MAT_LOCATION_COUNT],
    /// Whether the pose solve succeeded for this tracker.
    pub valid_pose: bool,
    /// Mean squared pixel error across all five correspondences, once solved.
    pub reprojection_error: Real,
    /// The tracker's pose in controller-tracking space, once solved.
    pub tracker_pose: Option<Iso3>,
    /// The tracker's pose relative to the head-reference camera, once solved.
    pub head_relative_pose: Option<Iso3>,
}

impl TrackerSampleSet {
    fn new(cap: usize) -> Self {
        Self {
            points: Vec::with_capacity(cap),
            averaged: [None; MAT_LOCATION_COUNT],
            valid_pose: false,
            reprojection_error: 0.0,
            tracker_pose: None,
            head_relative_pose: None,
        }
    }

    /// Number of raw samples buffered at the current location.
    pub fn sample_count(&self) -> usize {
        self.points.len()
    }

    /// Averaged pixel point for `location`, if that location has completed.
    pub fn averaged_at(&self, location: usize) -> Option<Pt2> {
        self.averaged[location]
    }

    /// Averaged points for all locations, once every location has completed.
    pub fn averaged_points(&self) -> Option<[Pt2; MAT_LOCATION_COUNT]> {
        if self.averaged.iter().all(Option::is_some) {
            Some(std::array::from_fn(|i| self.averaged[i].unwrap()))
        } else {
            None
        }
    }

    fn clear_current(&mut self) {
        self.points.clear();
    }

    fn reset(&mut self) {
        self.points.clear();
        self.averaged = [None; MAT_LOCATION_COUNT];
        self.valid_pose = false;
        self.reprojection_error = 0.0;
        self.tracker_pose = None;
        self.head_relative_pose = None;
    }
}

/// Head-reference pose buffer.
///
/// The required sample count reuses the mat location count: five pose
/// observations taken while the head rests at the calibration origin.
#[derive(Debug, Clone, Default)]
pub struct HeadSampleSet {
    positions: Vec<Pt3>,
    orientations: Vec<Quat>,
    average: Option<(Pt3, Quat)>,
}

impl HeadSampleSet {
    /// Number of samples buffered.
    pub fn sample_count(&self) -> usize {
        self.positions.len()
    }

    /// True once the buffer holds the required number of samples.
    pub fn is_full(&self) -> bool {
        self.positions.len() >= MAT_LOCATION_COUNT
    }

    /// The averaged (position, orientation), once the buffer has filled.
    pub fn average(&self) -> Option<(Pt3, Quat)> {
        self.average
    }

    fn add(&mut self, position: Pt3, orientation: Quat) {
        if self.is_full() {
            return;
        }
        self.positions.push(position);
        self.orientations.push(orientation);

        if self.is_full() {
            let n = self.positions.len() as Real;

            let mut pos_sum = Vec3::zeros();
            for p in &self.positions {
                pos_sum += p.coords;
            }

            // Component-wise quaternion sum, normalized. Valid as a mean only
            // while all samples stay in one rotational hemisphere; the head
            // rests motionless during sampling, so dispersion is tiny.
            let mut quat_sum = RawQuat::new(0.0, 0.0, 0.0, 0.0);
            for q in &self.orientations {
                quat_sum += *q.quaternion();
            }

            self.average = Some((
                Pt3::from(pos_sum / n),
                normalize_or_identity(&quat_sum),
            ));
        }
    }

    fn reset(&mut self) {
        self.positions.clear();
        self.orientations.clear();
        self.average = None;
    }
}

/// All sample state of one calibration run: one [`TrackerSampleSet`] per
/// configured tracker plus the single [`HeadSampleSet`].
#[derive(Debug, Clone)]
pub struct SampleAccumulator {
    trackers: Vec<TrackerSampleSet>,
    head: HeadSampleSet,
    samples_per_location: usize,
}

impl SampleAccumulator {
    /// Empty buffers for `tracker_count` trackers, `samples_per_location`
    /// raw 2D samples per tracker per location.
    pub fn new(tracker_count: usize, samples_per_location: usize) -> Self {
        Self {
            trackers: (0..tracker_count)
                .map(|_| TrackerSampleSet::new(samples_per_location))
                .collect(),
            head: HeadSampleSet::default(),
            samples_per_location,
        }
    }

    /// Number of tracker sample sets.
    pub fn tracker_count(&self) -> usize {
        self.trackers.len()
    }

    /// The sample set for `tracker_id`.
    pub fn tracker(&self, tracker_id: usize) -> &TrackerSampleSet {
        &self.trackers[tracker_id]
    }

    /// Mutable access for storing solve results.
    pub fn tracker_mut(&mut self, tracker_id: usize) -> &mut TrackerSampleSet {
        &mut self.trackers[tracker_id]
    }

    /// The head sample set.
    pub fn head(&self) -> &HeadSampleSet {
        &self.head
    }

    /// Append one 2D pixel observation for `tracker_id` at `location`.
    ///
    /// No-op once the buffer holds the configured sample count or the
    /// location already has an average. On the append that fills the buffer,
    /// the arithmetic mean of all buffered points is stored as the location's
    /// averaged point. The caller only invokes this while the controller is
    /// stable and observed by this tracker.
    pub fn add_screen_sample(&mut self, tracker_id: usize, location: usize, point: Pt2) {
        let cap = self.samples_per_location;
        let set = &mut self.trackers[tracker_id];

        if set.averaged[location].is_some() || set.points.len() >= cap {
            return;
        }

        set.points.push(point);

        if set.points.len() >= cap {
            let n = set.points.len() as Real;
            let mut sum = matcal_core::Vec2::zeros();
            for p in &set.points {
                sum += p.coords;
            }
            set.averaged[location] = Some(Pt2::from(sum / n));
        }
    }

    /// True once `tracker_id` has an averaged point at `location`.
    pub fn location_complete(&self, tracker_id: usize, location: usize) -> bool {
        self.trackers[tracker_id].averaged[location].is_some()
    }

    /// True once every tracker has an averaged point at `location`.
    pub fn all_complete_at(&self, location: usize) -> bool {
        self.trackers
            .iter()
            .all(|t| t.averaged[location].is_some())
    }

    /// Discard every tracker's raw buffer for the in-progress location,
    /// keeping completed location averages.
    pub fn clear_location_buffers(&mut self) {
        for t in &mut self.trackers {
            t.clear_current();
        }
    }

    /// Discard one tracker's raw buffer for the in-progress location.
    pub fn clear_tracker_buffer(&mut self, tracker_id: usize) {
        self.trackers[tracker_id].clear_current();
    }

    /// Append one head-reference pose sample; no-op when full. On the append
    /// that fills the buffer, positions are averaged component-wise and
    /// orientations are summed then normalized.
    pub fn add_head_sample(&mut self, position: Pt3, orientation: Quat) {
        self.head.add(position, orientation);
    }

    /// Clear the head buffer and its average.
    pub fn reset_head(&mut self) {
        self.head.reset();
    }

    /// Full reset: all tracker buffers, averages and results, plus the head
    /// buffer.
    pub fn reset_all(&mut self) {
        for t in &mut self.trackers {
            t.reset();
        }
        self.head.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const N: usize = 4;

    fn acc() -> SampleAccumulator {
        SampleAccumulator::new(2, N)
    }

    #[test]
    fn average_is_componentwise_mean() {
        let mut acc = acc();
        acc.add_screen_sample(0, 0, Pt2::new(10.0, 0.0));
        acc.add_screen_sample(0, 0, Pt2::new(20.0, 4.0));
        acc.add_screen_sample(0, 0, Pt2::new(30.0, 8.0));
        assert!(!acc.location_complete(0, 0));

        acc.add_screen_sample(0, 0, Pt2::new(40.0, 12.0));
        assert!(acc.location_complete(0, 0));

        let avg = acc.tracker(0).averaged_at(0).unwrap();
        assert!((avg.x - 25.0).abs() < 1e-12);
        assert!((avg.y - 6.0).abs() < 1e-12);
    }

    #[test]
    fn zero_samples_average_to_zero() {
        let mut acc = acc();
        for _ in 0..N {
            acc.add_screen_sample(0, 2, Pt2::new(0.0, 0.0));
        }
        let avg = acc.tracker(0).averaged_at(2).unwrap();
        assert_eq!(avg, Pt2::new(0.0, 0.0));
    }

    #[test]
    fn extra_sample_is_noop() {
        let mut acc = acc();
        for _ in 0..N {
            acc.add_screen_sample(0, 0, Pt2::new(1.0, 1.0));
        }
        let avg_before = acc.tracker(0).averaged_at(0).unwrap();

        acc.add_screen_sample(0, 0, Pt2::new(1000.0, 1000.0));
        assert_eq!(acc.tracker(0).averaged_at(0).unwrap(), avg_before);
        assert_eq!(acc.tracker(0).sample_count(), N);
    }

    #[test]
    fn trackers_buffer_independently() {
        let mut acc = acc();
        acc.add_screen_sample(0, 0, Pt2::new(1.0, 1.0));
        acc.add_screen_sample(1, 0, Pt2::new(2.0, 2.0));
        assert_eq!(acc.tracker(0).sample_count(), 1);
        assert_eq!(acc.tracker(1).sample_count(), 1);
        assert!(!acc.all_complete_at(0));
    }

    #[test]
    fn clear_location_keeps_completed_averages() {
        let mut acc = acc();
        for _ in 0..N {
            acc.add_screen_sample(0, 0, Pt2::new(5.0, 5.0));
        }
        // New location: partial progress, then discard.
        acc.clear_location_buffers();
        acc.add_screen_sample(0, 1, Pt2::new(9.0, 9.0));
        acc.clear_location_buffers();

        assert_eq!(acc.tracker(0).sample_count(), 0);
        assert!(acc.location_complete(0, 0));
        assert!(!acc.location_complete(0, 1));
    }

    #[test]
    fn clear_single_tracker_buffer() {
        let mut acc = acc();
        acc.add_screen_sample(0, 0, Pt2::new(1.0, 1.0));
        acc.add_screen_sample(1, 0, Pt2::new(1.0, 1.0));
        acc.clear_tracker_buffer(0);
        assert_eq!(acc.tracker(0).sample_count(), 0);
        assert_eq!(acc.tracker(1).sample_count(), 1);
    }

    #[test]
    fn averaged_points_requires_all_locations() {
        let mut acc = acc();
        for loc in 0..MAT_LOCATION_COUNT - 1 {
            for _ in 0..N {
                acc.add_screen_sample(0, loc, Pt2::new(loc as Real, 0.0));
            }
            acc.clear_location_buffers();
        }
        assert!(acc.tracker(0).averaged_points().is_none());

        for _ in 0..N {
            acc.add_screen_sample(0, MAT_LOCATION_COUNT - 1, Pt2::new(4.0, 0.0));
        }
        let pts = acc.tracker(0).averaged_points().unwrap();
        assert_eq!(pts.len(), MAT_LOCATION_COUNT);
        assert!((pts[4].x - 4.0).abs() < 1e-12);
    }

    #[test]
    fn head_average_position_and_orientation() {
        let mut acc = acc();
        let q = Quat::from_euler_angles(0.0, 0.2, 0.0);
        for i in 0..MAT_LOCATION_COUNT {
            acc.add_head_sample(Pt3::new(i as Real, 10.0, 0.0), q);
        }
        assert!(acc.head().is_full());

        let (pos, orient) = acc.head().average().unwrap();
        assert!((pos.x - 2.0).abs() < 1e-12);
        assert!((pos.y - 10.0).abs() < 1e-12);
        assert!(orient.angle_to(&q) < 1e-9);
    }

    #[test]
    fn head_sample_past_cap_is_noop() {
        let mut acc = acc();
        for _ in 0..MAT_LOCATION_COUNT + 3 {
            acc.add_head_sample(Pt3::origin(), Quat::identity());
        }
        assert_eq!(acc.head().sample_count(), MAT_LOCATION_COUNT);
    }

    #[test]
    fn antipodal_orientation_pairs_cancel_in_component_sum() {
        let mut acc = acc();
        let q = Quat::from_euler_angles(0.0, std::f64::consts::PI, 0.0);
        let q_neg = Quat::new_unchecked(-*q.quaternion());

        // Antipodal representations of the same rotation cancel in the raw
        // component sum; only the identity sample survives.
        acc.add_head_sample(Pt3::origin(), q);
        acc.add_head_sample(Pt3::origin(), q_neg);
        acc.add_head_sample(Pt3::origin(), q);
        acc.add_head_sample(Pt3::origin(), q_neg);
        acc.add_head_sample(Pt3::origin(), Quat::identity());

        let (_, orient) = acc.head().average().unwrap();
        assert!(orient.angle_to(&Quat::identity()) < 1e-9);
    }

    #[test]
    fn reset_all_clears_everything() {
        let mut acc = acc();
        for _ in 0..N {
            acc.add_screen_sample(0, 0, Pt2::new(1.0, 1.0));
        }
        acc.add_head_sample(Pt3::origin(), Quat::identity());
        acc.tracker_mut(0).valid_pose = true;

        acc.reset_all();

        assert!(!acc.location_complete(0, 0));
        assert_eq!(acc.tracker(0).sample_count(), 0);
        assert!(!acc.tracker(0).valid_pose);
        assert_eq!(acc.head().sample_count(), 0);
        assert!(acc.head().average().is_none());
    }
}

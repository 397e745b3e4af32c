//! Stability dwell detection.

use std::time::{Duration, Instant};

/// Tracks how long a per-tick stability signal has held continuously and
/// reports when a configured dwell threshold is reached.
///
/// Any false observation fully resets the timer: there is no partial credit
/// for earlier stable stretches.
#[derive(Debug, Clone)]
pub struct StabilityDetector {
    dwell: Duration,
    stable_since: Option<Instant>,
}

impl StabilityDetector {
    /// Detector requiring the signal to hold for `dwell`.
    pub fn new(dwell: Duration) -> Self {
        Self {
            dwell,
            stable_since: None,
        }
    }

    /// Feed one observation of the stability signal.
    ///
    /// Returns true once the signal has been continuously true for at least
    /// the dwell duration, counted from the false→true edge.
    pub fn observe(&mut self, is_stable_now: bool, now: Instant) -> bool {
        if !is_stable_now {
            self.stable_since = None;
            return false;
        }

        let since = *self.stable_since.get_or_insert(now);
        now.duration_since(since) >= self.dwell
    }

    /// True while the last observation was stable.
    pub fn is_stable(&self) -> bool {
        self.stable_since.is_some()
    }

    /// How long the signal has currently held, if it is holding.
    pub fn stable_for(&self, now: Instant) -> Option<Duration> {
        self.stable_since.map(|since| now.duration_since(since))
    }

    /// Forget any accumulated stable time.
    pub fn reset(&mut self) {
        self.stable_since = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DWELL: Duration = Duration::from_millis(1000);

    #[test]
    fn reports_exactly_at_threshold() {
        let mut det = StabilityDetector::new(DWELL);
        let t0 = Instant::now();

        assert!(!det.observe(true, t0));
        assert!(!det.observe(true, t0 + Duration::from_millis(500)));
        assert!(!det.observe(true, t0 + Duration::from_millis(999)));
        assert!(det.observe(true, t0 + Duration::from_millis(1000)));
        assert!(det.observe(true, t0 + Duration::from_millis(1500)));
    }

    #[test]
    fn instability_resets_without_partial_credit() {
        let mut det = StabilityDetector::new(DWELL);
        let t0 = Instant::now();

        assert!(!det.observe(true, t0));
        assert!(!det.observe(true, t0 + Duration::from_millis(900)));
        assert!(!det.observe(false, t0 + Duration::from_millis(950)));

        // The streak restarts from the next true edge.
        let t1 = t0 + Duration::from_millis(1000);
        assert!(!det.observe(true, t1));
        assert!(!det.observe(true, t1 + Duration::from_millis(999)));
        assert!(det.observe(true, t1 + Duration::from_millis(1000)));
    }

    #[test]
    fn stable_for_tracks_elapsed() {
        let mut det = StabilityDetector::new(DWELL);
        let t0 = Instant::now();

        assert_eq!(det.stable_for(t0), None);
        det.observe(true, t0);
        assert_eq!(
            det.stable_for(t0 + Duration::from_millis(250)),
            Some(Duration::from_millis(250))
        );

        det.reset();
        assert!(!det.is_stable());
        assert_eq!(det.stable_for(t0), None);
    }

    #[test]
    fn zero_dwell_reports_immediately() {
        let mut det = StabilityDetector::new(Duration::ZERO);
        assert!(det.observe(true, Instant::now()));
    }
}

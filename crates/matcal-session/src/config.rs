//! Session configuration.

use std::time::Duration;

use matcal_core::Iso3;
use serde::{Deserialize, Serialize};

/// Default dwell: how long the stability signal must hold before sampling.
pub const DEFAULT_DWELL_MS: u64 = 1000;

/// Default number of 2D samples accumulated per tracker at each mat location.
pub const DEFAULT_SAMPLES_PER_LOCATION: usize = 100;

/// Build-time tunables of the calibration procedure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Minimum continuous stable duration before recording starts.
    pub dwell: Duration,

    /// 2D samples required per tracker at each mat location.
    pub samples_per_location: usize,

    /// Where the calibration mat origin sits in controller-tracking space.
    /// Identity means the mat is centered at the tracking origin.
    pub calibration_offset: Iso3,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            dwell: Duration::from_millis(DEFAULT_DWELL_MS),
            samples_per_location: DEFAULT_SAMPLES_PER_LOCATION,
            calibration_offset: Iso3::identity(),
        }
    }
}

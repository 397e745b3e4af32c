//! Per-tracker camera intrinsics.
//!
//! Each optical tracker reports the pixel extents of its image and a pinhole
//! intrinsic matrix. Lens distortion is not modeled here: the observation
//! pipeline hands the session already-undistorted pixel locations.

use serde::{Deserialize, Serialize};

use crate::math::{Mat3, Real};

/// Pinhole intrinsics for one optical tracker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackerIntrinsics {
    /// Image width in pixels.
    pub width: Real,
    /// Image height in pixels.
    pub height: Real,
    /// Focal length along x (pixels).
    pub fx: Real,
    /// Focal length along y (pixels).
    pub fy: Real,
    /// Principal point x (pixels).
    pub cx: Real,
    /// Principal point y (pixels).
    pub cy: Real,
}

impl TrackerIntrinsics {
    /// Intrinsics with the principal point at the image center.
    pub fn centered(width: Real, height: Real, fx: Real, fy: Real) -> Self {
        Self {
            width,
            height,
            fx,
            fy,
            cx: width * 0.5,
            cy: height * 0.5,
        }
    }

    /// The 3×3 camera matrix `K` (zero skew).
    pub fn k_matrix(&self) -> Mat3 {
        Mat3::new(
            self.fx, 0.0, self.cx, //
            0.0, self.fy, self.cy, //
            0.0, 0.0, 1.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn k_matrix_layout() {
        let k = TrackerIntrinsics {
            width: 640.0,
            height: 480.0,
            fx: 554.0,
            fy: 554.0,
            cx: 320.0,
            cy: 240.0,
        };
        let m = k.k_matrix();
        assert_eq!(m[(0, 0)], 554.0);
        assert_eq!(m[(0, 2)], 320.0);
        assert_eq!(m[(1, 2)], 240.0);
        assert_eq!(m[(2, 2)], 1.0);
    }

    #[test]
    fn centered_principal_point() {
        let k = TrackerIntrinsics::centered(640.0, 480.0, 500.0, 500.0);
        assert_eq!(k.cx, 320.0);
        assert_eq!(k.cy, 240.0);
    }

    #[test]
    fn json_roundtrip() {
        let k = TrackerIntrinsics::centered(640.0, 480.0, 554.0, 550.0);
        let json = serde_json::to_string(&k).unwrap();
        let de: TrackerIntrinsics = serde_json::from_str(&json).unwrap();
        assert_eq!(k, de);
    }
}

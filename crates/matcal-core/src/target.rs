//! Calibration mat geometry.
//!
//! The mat is a flat printed sheet with five marked sample locations: one at
//! each corner plus the center. The controller is stood upright on each
//! location in turn, so every 3D sample point sits at the height of the
//! controller's tracking bulb above the mat surface.
//!
//! All coordinates are expressed in the calibration-origin frame: x/z span
//! the mat plane, y points up, origin at the mat center.

use crate::math::{Pt3, Real};

/// Number of sample locations on the mat.
pub const MAT_LOCATION_COUNT: usize = 5;

/// Height of the controller bulb center above the mat surface (cm).
pub const BULB_HEIGHT: Real = 17.7;

/// Half the long side of the mat sheet (cm).
pub const LOCATION_X_OFFSET: Real = 14.0;

/// Half the short side of the mat sheet (cm).
pub const LOCATION_Z_OFFSET: Real = 10.75;

/// The five sample locations in calibration-origin coordinates, in the order
/// the operator is guided through them.
pub const MAT_LOCATIONS: [[Real; 3]; MAT_LOCATION_COUNT] = [
    [LOCATION_X_OFFSET, BULB_HEIGHT, LOCATION_Z_OFFSET],
    [-LOCATION_X_OFFSET, BULB_HEIGHT, LOCATION_Z_OFFSET],
    [0.0, BULB_HEIGHT, 0.0],
    [-LOCATION_X_OFFSET, BULB_HEIGHT, -LOCATION_Z_OFFSET],
    [LOCATION_X_OFFSET, BULB_HEIGHT, -LOCATION_Z_OFFSET],
];

/// Operator-facing label for each sample location.
pub const MAT_LOCATION_LABELS: [&str; MAT_LOCATION_COUNT] = [
    "+X+Z Corner",
    "-X+Z Corner",
    "Center",
    "-X-Z Corner",
    "+X-Z Corner",
];

/// The mat location at `index` as a 3D point.
///
/// # Panics
///
/// Panics if `index >= MAT_LOCATION_COUNT`.
pub fn mat_location(index: usize) -> Pt3 {
    let [x, y, z] = MAT_LOCATIONS[index];
    Pt3::new(x, y, z)
}

/// All mat locations as 3D points, in operator order.
pub fn mat_locations() -> [Pt3; MAT_LOCATION_COUNT] {
    std::array::from_fn(mat_location)
}

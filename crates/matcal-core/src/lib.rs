//! Core types for `matcal`: guided calibration of optical tracker poses
//! against a physical calibration mat.
//!
//! This crate contains:
//! - linear algebra type aliases (`Real`, `Vec2`, `Pt3`, `Iso3`, ...),
//! - the tracker camera model ([`TrackerIntrinsics`]),
//! - the calibration mat geometry ([`target`]): 5 labeled sample locations
//!   expressed in the calibration-origin frame.

/// Linear algebra type aliases and rigid-transform helpers.
pub mod math;
/// Per-tracker camera intrinsics.
pub mod intrinsics;
/// Calibration mat sample locations.
pub mod target;

pub use intrinsics::*;
pub use math::*;
pub use target::*;

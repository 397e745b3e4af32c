//! Mathematical type definitions and small rigid-transform helpers.
//!
//! Coordinate-frame naming convention used throughout the workspace:
//! an `Iso3` named `a_in_b` places frame `A` as seen from frame `B`, i.e.
//! it maps coordinates expressed in `A` into coordinates expressed in `B`.
//! Compositions therefore read right to left: `c = b_in_c * a_in_b` maps
//! `A` coordinates into `C` coordinates.

use nalgebra::{
    Isometry3, Matrix3, Point2, Point3, Quaternion, Translation3, UnitQuaternion, Vector2, Vector3,
};

/// Scalar type used throughout the library (currently `f64`).
pub type Real = f64;

/// 2D vector with [`Real`] components.
pub type Vec2 = Vector2<Real>;
/// 3D vector with [`Real`] components.
pub type Vec3 = Vector3<Real>;
/// 2D point with [`Real`] coordinates.
pub type Pt2 = Point2<Real>;
/// 3D point with [`Real`] coordinates.
pub type Pt3 = Point3<Real>;
/// 3×3 matrix with [`Real`] entries.
pub type Mat3 = Matrix3<Real>;
/// Unit quaternion orientation with [`Real`] components.
pub type Quat = UnitQuaternion<Real>;
/// Raw (not necessarily unit) quaternion, used for orientation averaging.
pub type RawQuat = Quaternion<Real>;
/// 3D rigid transform (SE(3)) using [`Real`].
pub type Iso3 = Isometry3<Real>;

/// Build a rigid transform from an orientation and a position.
///
/// The result places the oriented frame at `position`, i.e. it maps local
/// coordinates into the frame `position`/`orientation` are expressed in.
pub fn iso_from_pose(orientation: &Quat, position: &Pt3) -> Iso3 {
    Iso3::from_parts(Translation3::from(position.coords), *orientation)
}

/// Normalize a raw quaternion sum into a unit orientation.
///
/// Falls back to the identity orientation when the sum is too close to zero
/// to normalize (antipodal samples cancelling out).
pub fn normalize_or_identity(q: &RawQuat) -> Quat {
    Quat::try_new(*q, 1e-9).unwrap_or_else(Quat::identity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn iso_from_pose_maps_origin_to_position() {
        let q = Quat::from_euler_angles(0.1, -0.2, 0.3);
        let p = Pt3::new(1.0, 2.0, 3.0);
        let iso = iso_from_pose(&q, &p);

        let mapped = iso.transform_point(&Pt3::origin());
        assert_relative_eq!(mapped, p, epsilon = 1e-12);
    }

    #[test]
    fn normalize_or_identity_normalizes() {
        let q = RawQuat::new(2.0, 0.0, 0.0, 0.0);
        let n = normalize_or_identity(&q);
        assert_relative_eq!(n.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(n.w, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn normalize_or_identity_degenerate_sum() {
        let q = RawQuat::new(0.0, 0.0, 0.0, 0.0);
        let n = normalize_or_identity(&q);
        assert_eq!(n, Quat::identity());
    }
}

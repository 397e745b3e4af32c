use anyhow::Result;
use matcal_core::{Iso3, Mat3, Real};
use nalgebra::{Matrix3, Rotation3, Translation3, UnitQuaternion, Vector3};

/// Decompose a plane-induced homography into a rigid pose.
///
/// Given intrinsics `K` and a homography `H` mapping plane coordinates
/// (points on `Z = 0` in the plane's own frame) to pixels, recovers the pose
/// `T_C_P` that maps plane coordinates into the camera frame. The first two
/// columns of `K⁻¹H` are the in-plane rotation axes up to a common scale;
/// the third rotation axis is their cross product and the result is
/// projected onto SO(3).
pub fn pose_from_homography(kmtx: &Mat3, hmtx: &Mat3) -> Result<Iso3> {
    let k_inv = kmtx
        .try_inverse()
        .ok_or_else(|| anyhow::anyhow!("intrinsic matrix is not invertible"))?;

    let k_inv_h1 = k_inv * hmtx.column(0);
    let k_inv_h2 = k_inv * hmtx.column(1);
    let h3 = hmtx.column(2).into_owned();

    // Common scale: average the norms of the first two columns.
    let norm1 = k_inv_h1.norm();
    let norm2 = k_inv_h2.norm();
    if norm1 <= Real::EPSILON || norm2 <= Real::EPSILON {
        anyhow::bail!("degenerate homography: vanishing rotation columns");
    }
    let mut lambda = 1.0 / ((norm1 + norm2) * 0.5);

    // H is determined up to sign; pick the solution that places the plane in
    // front of the camera. Negating lambda flips r1, r2 and t while leaving
    // r3 = r1 × r2 unchanged, so the rotation stays proper.
    if lambda * (k_inv * h3).z < 0.0 {
        lambda = -lambda;
    }

    let r1 = (lambda * k_inv_h1).into_owned();
    let r2 = (lambda * k_inv_h2).into_owned();
    let r3 = r1.cross(&r2);

    let mut r_mat = Matrix3::<Real>::zeros();
    r_mat.set_column(0, &r1);
    r_mat.set_column(1, &r2);
    r_mat.set_column(2, &r3);

    // Project onto SO(3) (polar decomposition via SVD).
    let svd = r_mat.svd(true, true);
    let u = svd.u.ok_or_else(|| anyhow::anyhow!("svd failed in pose decomposition"))?;
    let v_t = svd
        .v_t
        .ok_or_else(|| anyhow::anyhow!("svd failed in pose decomposition"))?;
    let mut r_orth = u * v_t;
    if r_orth.determinant() < 0.0 {
        let mut u_flipped = u;
        u_flipped.column_mut(2).neg_mut();
        r_orth = u_flipped * v_t;
    }

    let t_vec: Vector3<Real> = lambda * (k_inv * h3);

    let rot = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(r_orth));
    Ok(Iso3::from_parts(Translation3::from(t_vec), rot))
}

use anyhow::Result;
use matcal_core::{Iso3, Mat3, Pt2, Pt3, Real, Vec3};
use nalgebra::{DMatrix, Matrix3, Rotation3, Translation3, UnitQuaternion};

use crate::homography::dlt_homography;
use crate::planar_pose::pose_from_homography;

/// Camera pose from coplanar 3D/2D point correspondences.
///
/// `world` are 3D points in world coordinates (they must lie on, or very
/// near, a common plane), `image` their pixel observations, and `kmtx` the
/// camera intrinsic matrix. A best-fit plane frame is built from the points
/// via SVD, the plane→image homography is estimated with DLT, decomposed
/// into a pose, and the plane frame chained back into the world frame.
///
/// Returns `T_C_W`: the transform from world coordinates into the camera
/// frame. Fails on fewer than four correspondences, on a degenerate
/// (near-collinear) point configuration, or when the recovered pose would
/// place any correspondence behind the camera.
pub fn planar_pnp(world: &[Pt3], image: &[Pt2], kmtx: &Mat3) -> Result<Iso3> {
    let n = world.len();
    if n < 4 || image.len() != n {
        anyhow::bail!(
            "need at least 4 coplanar correspondences, got {} world / {} image",
            n,
            image.len()
        );
    }

    // Best-fit plane frame: centroid plus principal axes of the spread.
    let centroid = {
        let mut sum = Vec3::zeros();
        for p in world {
            sum += p.coords;
        }
        Pt3::from(sum / n as Real)
    };

    let mut centered = DMatrix::<Real>::zeros(3, n);
    for (i, p) in world.iter().enumerate() {
        centered.set_column(i, &(p - centroid));
    }

    let svd = centered.svd(true, false);
    let u = svd
        .u
        .ok_or_else(|| anyhow::anyhow!("svd failed in plane fit"))?;
    let sing = &svd.singular_values;
    if sing[1] <= 1e-9 * sing[0].max(Real::EPSILON) {
        anyhow::bail!("degenerate point configuration: points are collinear");
    }

    let e1 = Vec3::new(u[(0, 0)], u[(1, 0)], u[(2, 0)]);
    let e2 = Vec3::new(u[(0, 1)], u[(1, 1)], u[(2, 1)]);
    let e3 = e1.cross(&e2);

    // Plane coordinates of each world point.
    let plane: Vec<Pt2> = world
        .iter()
        .map(|p| {
            let d = p - centroid;
            Pt2::new(d.dot(&e1), d.dot(&e2))
        })
        .collect();

    let h = dlt_homography(&plane, image)?;
    let cam_in_plane_inv = pose_from_homography(kmtx, &h)?; // T_C_P

    // Plane frame expressed in world coordinates: T_W_P.
    let mut r_wp = Matrix3::<Real>::zeros();
    r_wp.set_column(0, &e1);
    r_wp.set_column(1, &e2);
    r_wp.set_column(2, &e3);
    let plane_in_world = Iso3::from_parts(
        Translation3::from(centroid.coords),
        UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(r_wp)),
    );

    // T_C_W = T_C_P ∘ T_P_W.
    let cam_from_world = cam_in_plane_inv * plane_in_world.inverse();

    // Cheirality: every correspondence must land in front of the camera,
    // otherwise the observations match the mirrored (behind-camera) plane
    // and the pose is the antipodal solution.
    if world
        .iter()
        .any(|p| cam_from_world.transform_point(p).z <= 0.0)
    {
        anyhow::bail!("recovered pose places correspondences behind the camera");
    }

    Ok(cam_from_world)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reproject::{mean_squared_pixel_error, project_points};
    use matcal_core::{mat_locations, TrackerIntrinsics};
    use nalgebra::Vector3;

    fn test_intrinsics() -> TrackerIntrinsics {
        TrackerIntrinsics::centered(640.0, 480.0, 554.0, 554.0)
    }

    fn look_down_pose() -> Iso3 {
        // Camera 80 cm in front of the mat, pitched down toward it.
        let rot = Rotation3::from_euler_angles(-0.4, 0.1, 0.05);
        Iso3::from_parts(Translation3::new(2.0, -10.0, 80.0), rot.into())
    }

    #[test]
    fn recovers_pose_from_mat_locations() {
        let k = test_intrinsics();
        let kmtx = k.k_matrix();
        let iso_gt = look_down_pose();

        let world: Vec<Pt3> = mat_locations().to_vec();
        let image = project_points(&world, &iso_gt, &kmtx);

        let est = planar_pnp(&world, &image, &kmtx).unwrap();

        let dt = (est.translation.vector - iso_gt.translation.vector).norm();
        assert!(dt < 1e-6, "translation error too large: {dt}");
        let ang = est.rotation.angle_to(&iso_gt.rotation);
        assert!(ang < 1e-6, "rotation error too large: {ang}");

        let err = mean_squared_pixel_error(&world, &image, &est, &kmtx);
        assert!(err < 1e-10, "re-projection error too large: {err}");
    }

    #[test]
    fn rejects_collinear_points() {
        let k = test_intrinsics();
        let kmtx = k.k_matrix();

        let world: Vec<Pt3> = (0..5).map(|i| Pt3::new(i as Real, 0.0, 0.0)).collect();
        let iso = Iso3::from_parts(
            Translation3::from(Vector3::new(0.0, 0.0, 50.0)),
            UnitQuaternion::identity(),
        );
        let image = project_points(&world, &iso, &kmtx);

        assert!(planar_pnp(&world, &image, &kmtx).is_err());
    }

    #[test]
    fn rejects_pose_with_points_behind_camera() {
        let kmtx = test_intrinsics().k_matrix();

        // Near-grazing view of the y=0 plane: the nearby points sit just in
        // front of the camera while the far point's depth goes negative.
        let world = vec![
            Pt3::new(0.0, 0.0, 0.0),
            Pt3::new(1.0, 0.0, 0.0),
            Pt3::new(0.0, 0.0, 1.0),
            Pt3::new(1.0, 0.0, 1.0),
            Pt3::new(100.0, 0.0, 0.0),
        ];
        let cam_from_world = Iso3::from_parts(
            Translation3::new(0.0, 0.0, 1.0),
            Rotation3::from_euler_angles(0.0, 0.03, 0.0).into(),
        );
        assert!(cam_from_world.transform_point(&world[4]).z < 0.0);

        let image = project_points(&world, &cam_from_world, &kmtx);
        assert!(planar_pnp(&world, &image, &kmtx).is_err());
    }

    #[test]
    fn rejects_too_few_points() {
        let kmtx = test_intrinsics().k_matrix();
        let world = vec![Pt3::origin(); 3];
        let image = vec![Pt2::origin(); 3];
        assert!(planar_pnp(&world, &image, &kmtx).is_err());
    }
}

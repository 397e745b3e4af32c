use matcal_core::{Mat3, Pt2};
use nalgebra::DMatrix;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HomographyError {
    #[error("need at least 4 point correspondences, got {0}")]
    NotEnoughPoints(usize),
    #[error("svd failed")]
    SvdFailed,
}

/// Estimate H such that `pixel ~ H * plane` using DLT.
///
/// `plane` are 2D points in plane coordinates, `pixel` their observed image
/// positions. The solution is the null vector of the stacked constraint
/// matrix, normalized so that `H[2,2] = 1` when well conditioned.
pub fn dlt_homography(plane: &[Pt2], pixel: &[Pt2]) -> Result<Mat3, HomographyError> {
    let n = plane.len();
    if n < 4 || pixel.len() != n {
        return Err(HomographyError::NotEnoughPoints(n));
    }

    let mut a = DMatrix::<f64>::zeros(2 * n, 9);

    for (i, (pp, px)) in plane.iter().zip(pixel.iter()).enumerate() {
        let (x, y) = (pp.x, pp.y);
        let (u, v) = (px.x, px.y);

        let r0 = 2 * i;
        let r1 = 2 * i + 1;

        a[(r0, 0)] = -x;
        a[(r0, 1)] = -y;
        a[(r0, 2)] = -1.0;
        a[(r0, 6)] = u * x;
        a[(r0, 7)] = u * y;
        a[(r0, 8)] = u;

        a[(r1, 3)] = -x;
        a[(r1, 4)] = -y;
        a[(r1, 5)] = -1.0;
        a[(r1, 6)] = v * x;
        a[(r1, 7)] = v * y;
        a[(r1, 8)] = v;
    }

    // Solve A h = 0 as the least eigenvector of AᵀA. The normal matrix is
    // always 9×9, so its SVD carries the full right-singular basis even for
    // the minimal 4-point case, where the thin SVD of the 8×9 A would not.
    let ata = a.transpose() * &a;
    let svd = ata.svd(false, true);
    let v_t = svd.v_t.ok_or(HomographyError::SvdFailed)?;
    let h = v_t.row(v_t.nrows() - 1);

    let mut h_mat = Mat3::zeros();
    for r in 0..3 {
        for c in 0..3 {
            h_mat[(r, c)] = h[3 * r + c];
        }
    }

    let scale = h_mat[(2, 2)];
    if scale.abs() > f64::EPSILON {
        h_mat /= scale;
    }

    Ok(h_mat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use matcal_core::Vec3;

    #[test]
    fn recovers_pure_scale() {
        let plane = vec![
            Pt2::new(0.0, 0.0),
            Pt2::new(1.0, 0.0),
            Pt2::new(1.0, 1.0),
            Pt2::new(0.0, 1.0),
        ];
        let pixel: Vec<Pt2> = plane.iter().map(|p| Pt2::new(3.0 * p.x, 3.0 * p.y)).collect();

        let h = dlt_homography(&plane, &pixel).unwrap();
        assert!((h[(0, 0)] - 3.0).abs() < 1e-6);
        assert!((h[(1, 1)] - 3.0).abs() < 1e-6);
        assert!(h[(0, 1)].abs() < 1e-6);
    }

    #[test]
    fn recovers_translation() {
        let plane = vec![
            Pt2::new(0.0, 0.0),
            Pt2::new(1.0, 0.0),
            Pt2::new(1.0, 1.0),
            Pt2::new(0.0, 1.0),
            Pt2::new(0.5, 0.5),
        ];
        let pixel: Vec<Pt2> = plane.iter().map(|p| Pt2::new(p.x + 10.0, p.y - 4.0)).collect();

        let h = dlt_homography(&plane, &pixel).unwrap();
        assert!((h[(0, 2)] - 10.0).abs() < 1e-6);
        assert!((h[(1, 2)] + 4.0).abs() < 1e-6);
    }

    #[test]
    fn four_point_minimal_case() {
        // Exactly 4 correspondences: the constraint matrix is 8×9, so the
        // null vector has to come out of the full right-singular basis.
        let h_gt = Mat3::new(
            1.2, 0.1, 5.0, //
            -0.05, 0.9, -2.0, //
            0.001, -0.002, 1.0,
        );
        let apply = |h: &Mat3, p: &Pt2| {
            let v = h * Vec3::new(p.x, p.y, 1.0);
            Pt2::new(v.x / v.z, v.y / v.z)
        };

        let plane = vec![
            Pt2::new(0.0, 0.0),
            Pt2::new(1.0, 0.0),
            Pt2::new(1.0, 1.0),
            Pt2::new(0.0, 1.0),
        ];
        let pixel: Vec<Pt2> = plane.iter().map(|p| apply(&h_gt, p)).collect();

        let h = dlt_homography(&plane, &pixel).unwrap();
        for (pp, px) in plane.iter().zip(pixel.iter()) {
            let mapped = apply(&h, pp);
            assert!((mapped - px).norm() < 1e-9, "mapped {mapped:?} vs {px:?}");
        }
    }

    #[test]
    fn too_few_points() {
        let p = vec![Pt2::new(0.0, 0.0); 3];
        assert!(matches!(
            dlt_homography(&p, &p),
            Err(HomographyError::NotEnoughPoints(3))
        ));
    }
}

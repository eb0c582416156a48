use serde::{Deserialize, Serialize};

use crate::error::{Degeneracy, HomographyError};
use crate::linalg;
use crate::matrix::HomographyMatrix;
use crate::utils::{self, MIN_CORRESPONDENCES};

/// Tolerances used by the DLT solver to reject degenerate configurations.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DltParams {
    /// Sine of the smallest angle a point triplet may span before it counts as collinear.
    pub collinearity_tolerance: f64,
    /// Minimum ratio between the 8th and the largest singular value of the DLT system.
    pub rank_tolerance: f64,
    /// Minimum absolute determinant of the unit-norm solution in normalized coordinates.
    pub min_determinant: f64,
}

impl Default for DltParams {
    fn default() -> Self {
        Self {
            collinearity_tolerance: 1e-6,
            rank_tolerance: 1e-9,
            min_determinant: 1e-8,
        }
    }
}

/// Compute the homography mapping `src` onto `dst` with the normalized DLT.
///
/// * `src` - The source 2d points with shape (N, 2), N >= 4.
/// * `dst` - The destination 2d points with shape (N, 2).
///
/// Returns the row-major 3x3 homography normalized so that `H[2][2] == 1`.
///
/// Example:
///
/// ```
/// use rallie_homography::{compute_homography, project_point};
///
/// let src = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
/// let dst = [[10.0, 20.0], [12.0, 20.0], [12.0, 22.0], [10.0, 22.0]];
/// let h = compute_homography(&src, &dst)?;
/// let p = project_point(&[0.5, 0.5], &h)?;
/// assert!((p[0] - 11.0).abs() < 1e-9 && (p[1] - 21.0).abs() < 1e-9);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn compute_homography(
    src: &[[f64; 2]],
    dst: &[[f64; 2]],
) -> Result<HomographyMatrix, HomographyError> {
    compute_homography_with(src, dst, &DltParams::default())
}

/// Same as [`compute_homography`] with explicit tolerances.
pub fn compute_homography_with(
    src: &[[f64; 2]],
    dst: &[[f64; 2]],
    params: &DltParams,
) -> Result<HomographyMatrix, HomographyError> {
    utils::validate_correspondences(src, dst)?;
    check_collinearity(src, params.collinearity_tolerance)?;
    check_collinearity(dst, params.collinearity_tolerance)?;

    let (src_n, t_src) = utils::normalize_points_2d(src)?;
    let (dst_n, t_dst) = utils::normalize_points_2d(dst)?;

    // construct matrix A
    let n = src_n.len();
    let mut mat_a = faer::Mat::<f64>::zeros(2 * n, 9);
    for (i, (p, q)) in src_n.iter().zip(dst_n.iter()).enumerate() {
        let (x, y) = (p[0], p[1]);
        let (u, v) = (q[0], q[1]);

        mat_a.write(2 * i, 0, x);
        mat_a.write(2 * i, 1, y);
        mat_a.write(2 * i, 2, 1.0);
        mat_a.write(2 * i, 6, -u * x);
        mat_a.write(2 * i, 7, -u * y);
        mat_a.write(2 * i, 8, -u);

        mat_a.write(2 * i + 1, 3, x);
        mat_a.write(2 * i + 1, 4, y);
        mat_a.write(2 * i + 1, 5, 1.0);
        mat_a.write(2 * i + 1, 6, -v * x);
        mat_a.write(2 * i + 1, 7, -v * y);
        mat_a.write(2 * i + 1, 8, -v);
    }

    // singular values come sorted in decreasing order
    let svd = mat_a.svd();
    let s = svd.s_diagonal();
    let s_max = s.read(0);
    let s_8th = s.read(7);
    if s_max <= 0.0 || s_8th / s_max < params.rank_tolerance {
        log::debug!(
            "rejecting {n} correspondences: rank deficient system (s8/s1 = {:e})",
            s_8th / s_max
        );
        return Err(Degeneracy::RankDeficient.into());
    }

    // the null vector is the right singular vector of the smallest singular value
    let v = svd.v();
    let h_norm = [
        [v.read(0, 8), v.read(1, 8), v.read(2, 8)],
        [v.read(3, 8), v.read(4, 8), v.read(5, 8)],
        [v.read(6, 8), v.read(7, 8), v.read(8, 8)],
    ];

    let det = linalg::det_mat33(&h_norm);
    if det.abs() < params.min_determinant {
        log::debug!("rejecting {n} correspondences: singular homography (det = {det:e})");
        return Err(Degeneracy::SingularMatrix.into());
    }

    // denormalize: H = T_dst^-1 * H_norm * T_src
    let t_dst_inv = utils::invert_similarity(&t_dst);
    let mut tmp = [[0.0; 3]; 3];
    let mut homo = [[0.0; 3]; 3];
    linalg::matmul33(&h_norm, &t_src, &mut tmp);
    linalg::matmul33(&t_dst_inv, &tmp, &mut homo);

    HomographyMatrix::new(homo).normalized()
}

fn check_collinearity(points: &[[f64; 2]], tolerance: f64) -> Result<(), HomographyError> {
    let collinear = if points.len() == MIN_CORRESPONDENCES {
        utils::has_collinear_triplet(points, tolerance)
    } else {
        utils::all_collinear(points, tolerance)
    };
    if collinear {
        log::debug!("rejecting {} points: collinear configuration", points.len());
        return Err(Degeneracy::CollinearPoints.into());
    }
    Ok(())
}

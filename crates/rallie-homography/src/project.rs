use crate::error::{Degeneracy, HomographyError};
use crate::linalg;
use crate::matrix::HomographyMatrix;

/// Smallest homogeneous scale accepted before a point is considered at infinity,
/// relative to the magnitude of the terms summed into `w`.
pub const MIN_HOMOGENEOUS_SCALE: f64 = f64::EPSILON;

/// Project a 2d point through a homography.
///
/// The point is lifted to `(x, y, 1)`, multiplied by the matrix and divided by
/// the resulting `w`. The matrix does not need to be normalized.
///
/// # Errors
///
/// Returns [`Degeneracy::PointAtInfinity`] when `w` cancels to ~0 relative to
/// the terms it is summed from (see [`MIN_HOMOGENEOUS_SCALE`]) or when the
/// projection overflows, and [`HomographyError::NonFiniteInput`] when the
/// point or the matrix holds NaN or infinite values.
pub fn project_point(
    point: &[f64; 2],
    homography: &HomographyMatrix,
) -> Result<[f64; 2], HomographyError> {
    if !point[0].is_finite() || !point[1].is_finite() || !homography.is_finite() {
        return Err(HomographyError::NonFiniteInput);
    }

    let mut out = [0.0; 3];
    linalg::mat33_mul_vec3(homography.as_array(), &[point[0], point[1], 1.0], &mut out);

    if out.iter().any(|v| !v.is_finite()) {
        return Err(Degeneracy::PointAtInfinity.into());
    }

    let w = out[2];
    let row = homography[2];
    let magnitude = (row[0] * point[0]).abs() + (row[1] * point[1]).abs() + row[2].abs();
    if w.abs() <= MIN_HOMOGENEOUS_SCALE * magnitude {
        return Err(Degeneracy::PointAtInfinity.into());
    }

    let projected = [out[0] / w, out[1] / w];
    if !projected[0].is_finite() || !projected[1].is_finite() {
        return Err(Degeneracy::PointAtInfinity.into());
    }
    Ok(projected)
}

/// Project a batch of points. Fails as a whole if any point fails.
pub fn project_points(
    points: &[[f64; 2]],
    homography: &HomographyMatrix,
) -> Result<Vec<[f64; 2]>, HomographyError> {
    points.iter().map(|p| project_point(p, homography)).collect()
}

/// Euclidean distance between `H * src` and `dst`.
///
/// Points that cannot be projected get an infinite error.
pub fn reprojection_error(src: &[f64; 2], dst: &[f64; 2], homography: &HomographyMatrix) -> f64 {
    match project_point(src, homography) {
        Ok(p) => (p[0] - dst[0]).hypot(p[1] - dst[1]),
        Err(_) => f64::INFINITY,
    }
}

/// Per-correspondence reprojection errors of `homography` over `src -> dst`.
pub fn reprojection_errors(
    src: &[[f64; 2]],
    dst: &[[f64; 2]],
    homography: &HomographyMatrix,
) -> Result<Vec<f64>, HomographyError> {
    if src.len() != dst.len() {
        return Err(HomographyError::MismatchedLengths {
            source_len: src.len(),
            destination_len: dst.len(),
        });
    }
    Ok(src
        .iter()
        .zip(dst.iter())
        .map(|(s, d)| reprojection_error(s, d, homography))
        .collect())
}

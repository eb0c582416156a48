use crate::error::{Degeneracy, HomographyError};

/// Minimum number of correspondences needed to fix the 8 degrees of freedom.
pub const MIN_CORRESPONDENCES: usize = 4;

/// Check that two point sets can form a correspondence set.
pub fn validate_correspondences(src: &[[f64; 2]], dst: &[[f64; 2]]) -> Result<(), HomographyError> {
    if src.len() != dst.len() {
        return Err(HomographyError::MismatchedLengths {
            source_len: src.len(),
            destination_len: dst.len(),
        });
    }
    if src.len() < MIN_CORRESPONDENCES {
        return Err(HomographyError::InsufficientCorrespondences {
            required: MIN_CORRESPONDENCES,
            actual: src.len(),
        });
    }
    if src.iter().chain(dst.iter()).flatten().any(|v| !v.is_finite()) {
        return Err(HomographyError::NonFiniteInput);
    }
    Ok(())
}

/// Normalize points with a similarity transform to zero mean and mean distance sqrt(2).
///
/// Returns the normalized points together with the transform `T` such that
/// `x_norm = T * x`.
pub(crate) fn normalize_points_2d(
    x: &[[f64; 2]],
) -> Result<(Vec<[f64; 2]>, [[f64; 3]; 3]), HomographyError> {
    let n = x.len() as f64;
    let (mut mx, mut my) = (0.0, 0.0);
    for p in x {
        mx += p[0];
        my += p[1];
    }
    mx /= n;
    my /= n;

    let mut mean_dist = 0.0;
    for p in x {
        mean_dist += (p[0] - mx).hypot(p[1] - my);
    }
    mean_dist /= n;

    if mean_dist <= f64::EPSILON * mx.abs().max(my.abs()).max(1.0) {
        return Err(Degeneracy::CoincidentPoints.into());
    }
    let scale = std::f64::consts::SQRT_2 / mean_dist;

    let xn = x
        .iter()
        .map(|p| [(p[0] - mx) * scale, (p[1] - my) * scale])
        .collect();

    let t = [
        [scale, 0.0, -scale * mx],
        [0.0, scale, -scale * my],
        [0.0, 0.0, 1.0],
    ];
    Ok((xn, t))
}

/// Closed-form inverse of a normalizing similarity from [`normalize_points_2d`].
pub(crate) fn invert_similarity(t: &[[f64; 3]; 3]) -> [[f64; 3]; 3] {
    let s = t[0][0];
    [
        [1.0 / s, 0.0, -t[0][2] / s],
        [0.0, 1.0 / s, -t[1][2] / s],
        [0.0, 0.0, 1.0],
    ]
}

/// Whether three points lie on one line.
///
/// The sine of the angle at `p0` is compared against `tolerance`, so the test
/// does not depend on the units of the points. Repeated points count as collinear.
pub fn is_collinear(p0: &[f64; 2], p1: &[f64; 2], p2: &[f64; 2], tolerance: f64) -> bool {
    let (ax, ay) = (p1[0] - p0[0], p1[1] - p0[1]);
    let (bx, by) = (p2[0] - p0[0], p2[1] - p0[1]);

    // rescale so the products below cannot overflow
    let s = ax.abs().max(ay.abs()).max(bx.abs()).max(by.abs());
    if s == 0.0 || !s.is_finite() {
        return true;
    }
    let (ax, ay, bx, by) = (ax / s, ay / s, bx / s, by / s);

    let na = ax.hypot(ay);
    let nb = bx.hypot(by);
    if na == 0.0 || nb == 0.0 {
        return true;
    }
    (ax * by - ay * bx).abs() <= tolerance * na * nb
}

/// Whether any three of the points are collinear.
pub fn has_collinear_triplet(points: &[[f64; 2]], tolerance: f64) -> bool {
    let n = points.len();
    for i in 0..n {
        for j in (i + 1)..n {
            for k in (j + 1)..n {
                if is_collinear(&points[i], &points[j], &points[k], tolerance) {
                    return true;
                }
            }
        }
    }
    false
}

/// Whether all points lie on a single line.
///
/// Uses the ratio of the principal axes of the point scatter; `tolerance` has
/// the same sine meaning as in [`is_collinear`].
pub fn all_collinear(points: &[[f64; 2]], tolerance: f64) -> bool {
    if points.len() < 3 {
        return true;
    }
    let n = points.len() as f64;
    let mx = points.iter().map(|p| p[0]).sum::<f64>() / n;
    let my = points.iter().map(|p| p[1]).sum::<f64>() / n;

    let s = points
        .iter()
        .map(|p| (p[0] - mx).abs().max((p[1] - my).abs()))
        .fold(0.0, f64::max);
    if s == 0.0 || !s.is_finite() {
        return true;
    }

    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for p in points {
        let (dx, dy) = ((p[0] - mx) / s, (p[1] - my) / s);
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }

    // eigenvalues of the 2x2 scatter matrix
    let half_trace = 0.5 * (sxx + syy);
    let disc = (0.25 * (sxx - syy) * (sxx - syy) + sxy * sxy).sqrt();
    let l_max = half_trace + disc;
    let l_min = (half_trace - disc).max(0.0);
    if l_max <= 0.0 {
        return true;
    }
    (l_min / l_max).sqrt() <= tolerance
}

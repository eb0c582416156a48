use rand::prelude::*;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::dlt::{compute_homography_with, DltParams};
use crate::error::{Degeneracy, HomographyError};
use crate::matrix::HomographyMatrix;
use crate::project::reprojection_error;
use crate::utils::{self, MIN_CORRESPONDENCES};

/// Parameters for RANSAC homography estimation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RansacParams {
    /// Maximum number of RANSAC iterations.
    pub max_iterations: usize,
    /// Inlier threshold on the reprojection error, in destination units (pixels).
    pub threshold: f64,
    /// Desired probability that at least one sample is outlier-free.
    pub confidence: f64,
    /// Minimum number of inliers required for acceptance.
    pub min_inliers: usize,
    /// Optional RNG seed for deterministic runs.
    pub random_seed: Option<u64>,
    /// Whether to refit the model on all inliers.
    pub refine: bool,
}

impl Default for RansacParams {
    fn default() -> Self {
        Self {
            max_iterations: 2000,
            threshold: 3.0,
            confidence: 0.995,
            min_inliers: MIN_CORRESPONDENCES,
            random_seed: Some(0),
            refine: true,
        }
    }
}

/// Result of a RANSAC homography fit.
#[derive(Clone, Debug)]
pub struct RansacResult {
    /// Estimated homography, normalized so that `H[2][2] == 1`.
    pub model: HomographyMatrix,
    /// Per-correspondence inlier mask.
    pub inliers: Vec<bool>,
    /// Total inlier count.
    pub inlier_count: usize,
    /// Sum of inlier reprojection errors (lower is better).
    pub score: f64,
    /// Number of iterations actually run.
    pub iterations: usize,
}

/// Estimate a homography with RANSAC using the 4-point DLT solver.
///
/// Minimal samples that are degenerate are skipped. The iteration budget
/// shrinks as better models are found, following the inlier ratio and
/// `params.confidence`.
pub fn find_homography_ransac(
    src: &[[f64; 2]],
    dst: &[[f64; 2]],
    params: &RansacParams,
    dlt: &DltParams,
) -> Result<RansacResult, HomographyError> {
    utils::validate_correspondences(src, dst)?;
    // no minimal sample of a set on one line can succeed
    for points in [src, dst] {
        if utils::all_collinear(points, dlt.collinearity_tolerance) {
            log::debug!("RANSAC rejects {} points: collinear configuration", points.len());
            return Err(Degeneracy::CollinearPoints.into());
        }
    }

    let mut rng = match params.random_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => {
            let mut tr = rand::rng();
            StdRng::from_rng(&mut tr)
        }
    };

    let n = src.len();
    let min_inliers = params.min_inliers.max(MIN_CORRESPONDENCES);
    let mut best: Option<Consensus> = None;
    let mut iterations = 0usize;
    let mut required_iterations = params.max_iterations;

    while iterations < required_iterations {
        iterations += 1;

        let sample = rand::seq::index::sample(&mut rng, n, MIN_CORRESPONDENCES);
        let mut s1 = [[0.0; 2]; MIN_CORRESPONDENCES];
        let mut s2 = [[0.0; 2]; MIN_CORRESPONDENCES];
        for (k, idx) in sample.iter().enumerate() {
            s1[k] = src[idx];
            s2[k] = dst[idx];
        }
        let model = match compute_homography_with(&s1, &s2, dlt) {
            Ok(h) => h,
            Err(_) => continue,
        };

        let consensus = Consensus::evaluate(model, src, dst, params.threshold);
        if consensus.is_better_than(best.as_ref()) {
            log::trace!(
                "RANSAC iteration {iterations}: {} / {n} inliers",
                consensus.count
            );
            required_iterations = adaptive_iterations(
                consensus.count as f64 / n as f64,
                params.confidence,
                params.max_iterations,
            );
            best = Some(consensus);
        }
    }

    let mut best = match best {
        Some(b) if b.count >= min_inliers => b,
        other => {
            let best_inliers = other.map_or(0, |b| b.count);
            log::debug!("RANSAC failed: {best_inliers} / {n} inliers after {iterations} iterations");
            return Err(HomographyError::RansacFailure {
                best_inliers,
                required: min_inliers,
            });
        }
    };

    if params.refine && best.count > MIN_CORRESPONDENCES {
        let (in_src, in_dst): (Vec<[f64; 2]>, Vec<[f64; 2]>) = best
            .inliers
            .iter()
            .enumerate()
            .filter(|(_, &inlier)| inlier)
            .map(|(i, _)| (src[i], dst[i]))
            .unzip();
        match compute_homography_with(&in_src, &in_dst, dlt) {
            Ok(refined) => {
                let consensus = Consensus::evaluate(refined, src, dst, params.threshold);
                if consensus.count >= best.count {
                    best = consensus;
                }
            }
            Err(err) => log::debug!("RANSAC refit on inliers failed: {err}"),
        }
    }

    log::debug!(
        "RANSAC: {} / {n} inliers after {iterations} iterations",
        best.count
    );

    Ok(RansacResult {
        model: best.model,
        inliers: best.inliers,
        inlier_count: best.count,
        score: best.score,
        iterations,
    })
}

struct Consensus {
    model: HomographyMatrix,
    inliers: Vec<bool>,
    count: usize,
    score: f64,
}

impl Consensus {
    fn evaluate(
        model: HomographyMatrix,
        src: &[[f64; 2]],
        dst: &[[f64; 2]],
        threshold: f64,
    ) -> Self {
        let mut inliers = vec![false; src.len()];
        let mut count = 0usize;
        let mut score = 0.0f64;
        for (i, (s, d)) in src.iter().zip(dst.iter()).enumerate() {
            let err = reprojection_error(s, d, &model);
            if err <= threshold {
                inliers[i] = true;
                count += 1;
                score += err;
            }
        }
        Self {
            model,
            inliers,
            count,
            score,
        }
    }

    fn is_better_than(&self, other: Option<&Consensus>) -> bool {
        match other {
            None => true,
            Some(o) => self.count > o.count || (self.count == o.count && self.score < o.score),
        }
    }
}

/// Number of iterations needed to draw one all-inlier minimal sample with the given confidence.
fn adaptive_iterations(inlier_ratio: f64, confidence: f64, max_iterations: usize) -> usize {
    let p_good = inlier_ratio.powi(MIN_CORRESPONDENCES as i32);
    if p_good <= f64::EPSILON {
        return max_iterations;
    }
    if p_good >= 1.0 {
        return 1;
    }
    let num = (1.0 - confidence.clamp(0.0, 1.0)).max(f64::MIN_POSITIVE).ln();
    let den = (1.0 - p_good).ln();
    let k = (num / den).ceil();
    if k.is_finite() && k >= 0.0 {
        (k as usize).clamp(1, max_iterations)
    } else {
        max_iterations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg;
    use approx::assert_relative_eq;

    fn apply(h: &[[f64; 3]; 3], p: &[f64; 2]) -> [f64; 2] {
        let mut out = [0.0; 3];
        linalg::mat33_mul_vec3(h, &[p[0], p[1], 1.0], &mut out);
        [out[0] / out[2], out[1] / out[2]]
    }

    fn grid(cols: usize, rows: usize, step: f64) -> Vec<[f64; 2]> {
        let mut pts = Vec::with_capacity(cols * rows);
        for r in 0..rows {
            for c in 0..cols {
                pts.push([c as f64 * step, r as f64 * step]);
            }
        }
        pts
    }

    #[test]
    fn test_ransac_rejects_outliers() -> Result<(), Box<dyn std::error::Error>> {
        let h_true = [[1.1, 0.05, 40.0], [-0.03, 0.95, 25.0], [2.0e-4, 1.0e-4, 1.0]];
        let src = grid(5, 4, 50.0);
        let mut dst: Vec<[f64; 2]> = src.iter().map(|p| apply(&h_true, p)).collect();

        let outliers = [1usize, 6, 9, 13, 17, 18];
        for (k, &i) in outliers.iter().enumerate() {
            dst[i][0] += 60.0 + 25.0 * k as f64;
            dst[i][1] -= 45.0 + 10.0 * k as f64;
        }

        let params = RansacParams {
            random_seed: Some(42),
            ..Default::default()
        };
        let result = find_homography_ransac(&src, &dst, &params, &DltParams::default())?;

        assert_eq!(result.inlier_count, src.len() - outliers.len());
        for (i, inlier) in result.inliers.iter().enumerate() {
            assert_eq!(*inlier, !outliers.contains(&i), "index {i}");
        }
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(result.model[i][j], h_true[i][j], epsilon = 1e-6);
            }
        }
        assert!(result.iterations < params.max_iterations);
        Ok(())
    }

    #[test]
    fn test_ransac_deterministic_with_seed() -> Result<(), Box<dyn std::error::Error>> {
        let h_true = [[0.8, 0.1, 5.0], [0.0, 1.2, -3.0], [1.0e-3, 0.0, 1.0]];
        let src = grid(4, 4, 10.0);
        let mut dst: Vec<[f64; 2]> = src.iter().map(|p| apply(&h_true, p)).collect();
        dst[3] = [500.0, -200.0];

        let params = RansacParams {
            random_seed: Some(7),
            refine: false,
            ..Default::default()
        };
        let a = find_homography_ransac(&src, &dst, &params, &DltParams::default())?;
        let b = find_homography_ransac(&src, &dst, &params, &DltParams::default())?;
        assert_eq!(a.model, b.model);
        assert_eq!(a.inliers, b.inliers);
        assert_eq!(a.iterations, b.iterations);
        Ok(())
    }

    #[test]
    fn test_ransac_failure_when_min_inliers_unreachable() {
        let h_true = [[1.0, 0.0, 1.0], [0.0, 1.0, 1.0], [0.0, 0.0, 1.0]];
        let src = grid(3, 3, 1.0);
        let dst: Vec<[f64; 2]> = src.iter().map(|p| apply(&h_true, p)).collect();

        let params = RansacParams {
            min_inliers: 20,
            max_iterations: 50,
            ..Default::default()
        };
        assert_eq!(
            find_homography_ransac(&src, &dst, &params, &DltParams::default()).map(|r| r.model),
            Err(HomographyError::RansacFailure {
                best_inliers: 9,
                required: 20
            })
        );
    }

    #[test]
    fn test_ransac_validates_input() {
        let pts = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]];
        assert!(matches!(
            find_homography_ransac(&pts, &pts, &RansacParams::default(), &DltParams::default()),
            Err(HomographyError::InsufficientCorrespondences { .. })
        ));
    }

    #[test]
    fn test_ransac_collinear_input() {
        let line: Vec<[f64; 2]> = (0..8).map(|i| [i as f64, 0.5 * i as f64 + 2.0]).collect();
        let spread = grid(4, 2, 10.0);
        let params = RansacParams::default();
        let dlt = DltParams::default();

        for (src, dst) in [(&line, &spread), (&spread, &line)] {
            assert!(matches!(
                find_homography_ransac(src, dst, &params, &dlt),
                Err(HomographyError::DegenerateGeometry(Degeneracy::CollinearPoints))
            ));
        }
        assert_eq!(
            crate::find_homography(&line, &spread, &crate::EstimationMethod::Ransac(params)),
            crate::find_homography(&line, &spread, &crate::EstimationMethod::Dlt)
        );
    }

    #[test]
    fn test_adaptive_iterations() {
        assert_eq!(adaptive_iterations(1.0, 0.99, 1000), 1);
        assert_eq!(adaptive_iterations(0.0, 0.99, 1000), 1000);
        // 0.5^4 = 1/16 good samples -> ceil(ln(0.01) / ln(15/16)) = 72
        assert_eq!(adaptive_iterations(0.5, 0.99, 1000), 72);
        assert_eq!(adaptive_iterations(0.5, 0.99, 50), 50);
    }
}

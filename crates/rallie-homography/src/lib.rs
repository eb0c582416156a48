#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Rallie homography
//!
//! Maps points between two planes, typically a camera image and the court
//! model it looks at.
//!
//! ## Key Features
//!
//! - **Normalized DLT**: least-squares homography from 4 or more correspondences
//! - **RANSAC**: robust estimation with outlier rejection
//! - **Projection**: single and batch point projection with reprojection errors
//! - **Degeneracy checks**: collinear, coincident and rank-deficient inputs are rejected
//!
//! ## Example: image to court
//!
//! ```rust
//! use rallie_homography::{compute_homography, project_point};
//!
//! // court corners in the image (pixels)
//! let image = [[412.0, 318.0], [1508.0, 322.0], [1795.0, 1012.0], [118.0, 1004.0]];
//! // the same corners on a doubles court (meters)
//! let court = [[0.0, 0.0], [10.97, 0.0], [10.97, 23.77], [0.0, 23.77]];
//!
//! let h = compute_homography(&image, &court)?;
//! let on_court = project_point(&[960.0, 660.0], &h)?;
//! println!("ball bounce at {:?} m", on_court);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};

/// Normalized direct linear transform solver.
pub mod dlt;

/// Error types.
pub mod error;

/// Small fixed-size linear algebra helpers.
pub mod linalg;

/// The homography matrix type.
pub mod matrix;

/// Point projection and reprojection error.
pub mod project;

/// RANSAC-based robust homography estimation.
pub mod ransac;

/// Input validation and point set conditioning.
pub mod utils;

pub use dlt::{compute_homography, compute_homography_with, DltParams};
pub use error::{Degeneracy, HomographyError};
pub use matrix::{HomographyMatrix, HOMOGRAPHY_LEN};
pub use project::{project_point, project_points, reprojection_error, reprojection_errors};
pub use ransac::{find_homography_ransac, RansacParams, RansacResult};

/// Enumeration of the estimation methods available in this crate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum EstimationMethod {
    /// Least-squares DLT over all correspondences.
    #[default]
    Dlt,
    /// RANSAC over minimal DLT samples.
    Ransac(RansacParams),
}

/// Dispatch function that routes to the chosen estimation method.
pub fn find_homography(
    src: &[[f64; 2]],
    dst: &[[f64; 2]],
    method: &EstimationMethod,
) -> Result<HomographyMatrix, HomographyError> {
    match method {
        EstimationMethod::Dlt => compute_homography(src, dst),
        EstimationMethod::Ransac(params) => {
            find_homography_ransac(src, dst, params, &DltParams::default()).map(|r| r.model)
        }
    }
}

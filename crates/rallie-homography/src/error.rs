/// Reason a point configuration or matrix cannot support a homography.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Degeneracy {
    /// All points of one set collapse to a single location.
    #[error("all points coincide")]
    CoincidentPoints,
    /// The points (or a minimal triplet of them) lie on a single line.
    #[error("points are collinear")]
    CollinearPoints,
    /// The DLT system has a null space of dimension greater than one.
    #[error("linear system is rank deficient")]
    RankDeficient,
    /// The estimated or supplied matrix is not invertible.
    #[error("matrix is singular")]
    SingularMatrix,
    /// The bottom-right element is ~0 and the matrix cannot be normalized.
    #[error("matrix scale element is zero")]
    ZeroScale,
    /// The homogeneous scale of a projected point is ~0.
    #[error("point maps to infinity")]
    PointAtInfinity,
}

/// Error types for homography estimation and projection.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HomographyError {
    /// Not enough point correspondences to constrain the homography.
    #[error("Homography requires at least {required} correspondences, got {actual}")]
    InsufficientCorrespondences {
        /// Minimum number of correspondences required.
        required: usize,
        /// Actual number of correspondences provided.
        actual: usize,
    },

    /// Source and destination point sets have different lengths.
    #[error("Mismatched point sets: source ({source_len}) != destination ({destination_len})")]
    MismatchedLengths {
        /// Number of source points.
        source_len: usize,
        /// Number of destination points.
        destination_len: usize,
    },

    /// A flat matrix did not contain exactly 9 values.
    #[error("Homography matrix needs 9 values, got {0}")]
    InvalidMatrixLength(usize),

    /// An input coordinate or matrix entry is NaN or infinite.
    #[error("Input contains non-finite values")]
    NonFiniteInput,

    /// The geometry cannot produce a meaningful result.
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(Degeneracy),

    /// RANSAC did not find a model with enough support.
    #[error("RANSAC failed: best model has {best_inliers} inliers, {required} required")]
    RansacFailure {
        /// Inlier count of the best model seen.
        best_inliers: usize,
        /// Minimum inlier count requested.
        required: usize,
    },
}

impl From<Degeneracy> for HomographyError {
    fn from(degeneracy: Degeneracy) -> Self {
        HomographyError::DegenerateGeometry(degeneracy)
    }
}

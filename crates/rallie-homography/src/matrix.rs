use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::error::{Degeneracy, HomographyError};
use crate::linalg;

/// Number of entries in a flattened 3x3 homography.
pub const HOMOGRAPHY_LEN: usize = 9;

/// A 3x3 projective transform stored row-major.
///
/// The matrix is defined up to a nonzero scale. Estimators return it with the
/// bottom-right element normalized to 1; matrices built by hand may use any scale.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HomographyMatrix([[f64; 3]; 3]);

impl HomographyMatrix {
    /// Create a homography from its rows.
    pub const fn new(rows: [[f64; 3]; 3]) -> Self {
        Self(rows)
    }

    /// The identity transform.
    pub const fn identity() -> Self {
        Self([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]])
    }

    /// Build a homography from 9 row-major values.
    ///
    /// Fails if the slice does not hold exactly 9 values or any of them is not finite.
    pub fn from_row_major(values: &[f64]) -> Result<Self, HomographyError> {
        if values.len() != HOMOGRAPHY_LEN {
            return Err(HomographyError::InvalidMatrixLength(values.len()));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(HomographyError::NonFiniteInput);
        }
        Ok(Self([
            [values[0], values[1], values[2]],
            [values[3], values[4], values[5]],
            [values[6], values[7], values[8]],
        ]))
    }

    /// Flatten the matrix into 9 row-major values.
    pub fn to_row_major(&self) -> [f64; HOMOGRAPHY_LEN] {
        let m = &self.0;
        [
            m[0][0], m[0][1], m[0][2], m[1][0], m[1][1], m[1][2], m[2][0], m[2][1], m[2][2],
        ]
    }

    /// Borrow the rows of the matrix.
    pub fn as_array(&self) -> &[[f64; 3]; 3] {
        &self.0
    }

    /// Whether every entry is finite.
    pub fn is_finite(&self) -> bool {
        self.0.iter().flat_map(|row| row.iter()).all(|v| v.is_finite())
    }

    /// Determinant of the matrix at its current scale.
    pub fn determinant(&self) -> f64 {
        linalg::det_mat33(&self.0)
    }

    /// Rescale so the bottom-right element equals 1.
    pub fn normalized(&self) -> Result<Self, HomographyError> {
        let norm = linalg::frobenius_norm_mat33(&self.0);
        let scale = self.0[2][2];
        if !norm.is_finite() || norm == 0.0 || scale.abs() <= 1e-12 * norm {
            return Err(Degeneracy::ZeroScale.into());
        }

        let mut out = self.0;
        out.iter_mut()
            .flat_map(|row| row.iter_mut())
            .for_each(|v| *v /= scale);
        Ok(Self(out))
    }

    /// Invert the transform, mapping destination points back to the source plane.
    ///
    /// The result is normalized when its bottom-right element allows it.
    pub fn inverse(&self) -> Result<Self, HomographyError> {
        let inv = linalg::inverse_mat33(&self.0).ok_or(Degeneracy::SingularMatrix)?;
        let inv = Self(inv);
        Ok(inv.normalized().unwrap_or(inv))
    }
}

impl Default for HomographyMatrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<[[f64; 3]; 3]> for HomographyMatrix {
    fn from(rows: [[f64; 3]; 3]) -> Self {
        Self(rows)
    }
}

impl From<HomographyMatrix> for [[f64; 3]; 3] {
    fn from(h: HomographyMatrix) -> Self {
        h.0
    }
}

impl Index<usize> for HomographyMatrix {
    type Output = [f64; 3];

    fn index(&self, row: usize) -> &Self::Output {
        &self.0[row]
    }
}

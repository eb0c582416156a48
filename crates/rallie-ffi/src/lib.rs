//! C ABI for the iOS app.
//!
//! Every entry point returns `false` in place of a null result: invalid
//! pointers, too few correspondences, degenerate geometry or a point mapping
//! to infinity. Outputs are only written on success.
#![deny(missing_docs)]

use std::slice;

use log::{info, warn};
use rallie_homography::{
    compute_homography, find_homography_ransac, project_point, DltParams, HomographyMatrix,
    RansacParams, HOMOGRAPHY_LEN,
};

/// A 2d point with the layout of `CGPoint` on 64-bit Apple platforms.
#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct RalliePoint2 {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl From<&RalliePoint2> for [f64; 2] {
    fn from(p: &RalliePoint2) -> Self {
        [p.x, p.y]
    }
}

impl From<[f64; 2]> for RalliePoint2 {
    fn from(p: [f64; 2]) -> Self {
        Self { x: p[0], y: p[1] }
    }
}

/// Installs `env_logger` for the library logs. Safe to call more than once.
#[no_mangle]
pub extern "C" fn rallie_init_logging() {
    let initialized =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .try_init()
            .is_ok();
    if initialized {
        info!("rallie logging initialized");
    }
}

/// Estimates the homography mapping `src` onto `dst`.
///
/// On success writes 9 row-major values to `out_matrix` and returns `true`.
///
/// # Safety
///
/// `src` and `dst` must point to `len` valid points each and `out_matrix` to
/// space for 9 `f64` values.
#[no_mangle]
pub unsafe extern "C" fn rallie_compute_homography(
    src: *const RalliePoint2,
    dst: *const RalliePoint2,
    len: usize,
    out_matrix: *mut f64,
) -> bool {
    let Some((src, dst)) = (unsafe { read_correspondences(src, dst, len) }) else {
        return false;
    };
    if out_matrix.is_null() {
        return false;
    }

    match compute_homography(&src, &dst) {
        Ok(h) => {
            unsafe { write_matrix(&h, out_matrix) };
            true
        }
        Err(err) => {
            warn!("homography estimation failed: {err}");
            false
        }
    }
}

/// Estimates the homography with RANSAC.
///
/// `threshold` is the inlier reprojection error in destination units. When
/// `out_inliers` is not null it receives one flag per correspondence.
///
/// # Safety
///
/// Same requirements as [`rallie_compute_homography`]; `out_inliers`, when not
/// null, must have space for `len` `bool` values.
#[no_mangle]
pub unsafe extern "C" fn rallie_compute_homography_ransac(
    src: *const RalliePoint2,
    dst: *const RalliePoint2,
    len: usize,
    threshold: f64,
    out_matrix: *mut f64,
    out_inliers: *mut bool,
) -> bool {
    let Some((src, dst)) = (unsafe { read_correspondences(src, dst, len) }) else {
        return false;
    };
    if out_matrix.is_null() || threshold.is_nan() || threshold <= 0.0 {
        return false;
    }

    let params = RansacParams {
        threshold,
        ..Default::default()
    };
    match find_homography_ransac(&src, &dst, &params, &DltParams::default()) {
        Ok(result) => {
            unsafe { write_matrix(&result.model, out_matrix) };
            if !out_inliers.is_null() {
                let out = unsafe { slice::from_raw_parts_mut(out_inliers, len) };
                out.copy_from_slice(&result.inliers);
            }
            true
        }
        Err(err) => {
            warn!("robust homography estimation failed: {err}");
            false
        }
    }
}

/// Projects `point` through the homography given as `matrix_len` row-major values.
///
/// # Safety
///
/// `matrix` must point to `matrix_len` valid `f64` values and `out_point` to a
/// writable point.
#[no_mangle]
pub unsafe extern "C" fn rallie_project_point(
    point: RalliePoint2,
    matrix: *const f64,
    matrix_len: usize,
    out_point: *mut RalliePoint2,
) -> bool {
    if matrix.is_null() || out_point.is_null() {
        return false;
    }

    let values = unsafe { slice::from_raw_parts(matrix, matrix_len) };
    let projected = HomographyMatrix::from_row_major(values)
        .and_then(|h| project_point(&(&point).into(), &h));

    match projected {
        Ok(p) => {
            unsafe { *out_point = p.into() };
            true
        }
        Err(err) => {
            warn!("point projection failed: {err}");
            false
        }
    }
}

/// Copies the two point arrays, or `None` if either pointer is null.
unsafe fn read_correspondences(
    src: *const RalliePoint2,
    dst: *const RalliePoint2,
    len: usize,
) -> Option<(Vec<[f64; 2]>, Vec<[f64; 2]>)> {
    if src.is_null() || dst.is_null() {
        return None;
    }
    let src = unsafe { slice::from_raw_parts(src, len) };
    let dst = unsafe { slice::from_raw_parts(dst, len) };
    Some((
        src.iter().map(Into::into).collect(),
        dst.iter().map(Into::into).collect(),
    ))
}

unsafe fn write_matrix(h: &HomographyMatrix, out_matrix: *mut f64) {
    let values = h.to_row_major();
    let out = unsafe { slice::from_raw_parts_mut(out_matrix, HOMOGRAPHY_LEN) };
    out.copy_from_slice(&values);
}

//! Linear least squares solver.
//!
//! Used wherever a problem is linear in its unknowns:
//!
//! ```text
//! minimize ||X β - y||^2
//! ```
//!
//! - closed-form guesses for linear models
//! - the damped normal equations of the Levenberg–Marquardt step, when the
//!   Cholesky factorization rejects a nearly singular matrix
//!
//! We use SVD because it handles tall (more rows than columns) and
//! rank-deficient systems; nalgebra's `QR::solve` is intended for square
//! systems and panics for non-square matrices.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser singular-value cutoffs.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Straight-line least squares `y ≈ slope * x + intercept`.
pub fn fit_line(x: &[f64], y: &[f64]) -> Option<(f64, f64)> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let (lo, hi) = crate::math::min_max(x)?;
    // A single distinct coordinate leaves the slope undetermined.
    if !(hi - lo).is_finite() || hi == lo {
        return None;
    }
    let design = DMatrix::from_fn(x.len(), 2, |i, j| if j == 0 { x[i] } else { 1.0 });
    let beta = solve_least_squares(&design, &DVector::from_column_slice(y))?;
    Some((beta[0], beta[1]))
}

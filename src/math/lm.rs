//! Levenberg–Marquardt nonlinear least squares.
//!
//! Minimizes `Σ r_i(x)^2` for a residual function `r: R^p -> R^n`:
//!
//! ```text
//! (JᵀJ + λ·diag(JᵀJ)) δ = -Jᵀr
//! ```
//!
//! Implementation notes:
//! - The Jacobian is estimated by forward differences; columns are independent,
//!   so they are evaluated in parallel.
//! - Bounds are honoured by projecting every trial point back into the box.
//! - The damped normal equations are solved by Cholesky, falling back to the
//!   SVD solver in [`crate::math::solve_least_squares`] when the matrix is not
//!   numerically positive definite.
//! - Running out of function evaluations is not an error: the report carries
//!   `converged = false` and the best point found. Non-finite residuals at the
//!   starting point, or an update that can never be solved, are errors.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::error::AnalysisError;
use crate::math::solve_least_squares;

const LAMBDA_MAX: f64 = 1e16;
const LAMBDA_MIN: f64 = 1e-15;

/// Optimizer settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LmOptions {
    /// Evaluation budget; `None` means `200 * (p + 1)`.
    pub max_nfev: Option<usize>,
    /// Relative reduction of the sum of squares below which we stop.
    pub ftol: f64,
    /// Relative step size below which we stop.
    pub xtol: f64,
    /// Largest gradient component below which we stop.
    pub gtol: f64,
    pub initial_lambda: f64,
    /// Relative finite-difference step.
    pub diff_step: f64,
}

impl Default for LmOptions {
    fn default() -> Self {
        Self {
            max_nfev: None,
            ftol: 1.5e-8,
            xtol: 1.5e-8,
            gtol: 1e-12,
            initial_lambda: 1e-3,
            diff_step: f64::EPSILON.sqrt(),
        }
    }
}

impl LmOptions {
    pub fn budget(&self, n_params: usize) -> usize {
        self.max_nfev.unwrap_or(200 * (n_params + 1)).max(1)
    }
}

/// Outcome of a minimization.
#[derive(Debug, Clone)]
pub struct LmReport {
    pub x: Vec<f64>,
    pub residuals: DVector<f64>,
    /// Sum of squared residuals at `x`.
    pub cost: f64,
    /// Jacobian at `x` (absent when there are no free parameters).
    pub jacobian: Option<DMatrix<f64>>,
    pub nfev: usize,
    pub iterations: usize,
    pub converged: bool,
    pub message: String,
}

/// Minimize the sum of squared residuals starting from `x0`.
///
/// `bounds[j]` is the `(min, max)` box for parameter `j` (use infinities for
/// unbounded). The residual function reports model failures as errors; those
/// are treated as rejected steps except at the starting point.
pub fn minimize<F>(
    residual_fn: F,
    x0: &[f64],
    bounds: &[(f64, f64)],
    opts: &LmOptions,
) -> Result<LmReport, AnalysisError>
where
    F: Fn(&[f64]) -> Result<DVector<f64>, AnalysisError> + Sync,
{
    let p = x0.len();
    if bounds.len() != p {
        return Err(AnalysisError::LengthMismatch {
            what: "parameter bounds".into(),
            expected: p,
            actual: bounds.len(),
        });
    }

    if let Some(j) = x0.iter().position(|v| !v.is_finite()) {
        return Err(AnalysisError::InvalidInput(format!(
            "starting value {j} is not finite ({})",
            x0[j]
        )));
    }
    if let Some(j) = bounds
        .iter()
        .position(|&(lo, hi)| lo.is_nan() || hi.is_nan() || lo > hi)
    {
        return Err(AnalysisError::InvalidInput(format!(
            "invalid bounds for parameter {j}: [{}, {}]",
            bounds[j].0, bounds[j].1
        )));
    }

    let budget = opts.budget(p);
    let mut x = project(x0, bounds);
    let mut r = residual_fn(&x)?;
    let mut nfev = 1usize;
    if !all_finite(&r) {
        return Err(AnalysisError::Optimization(
            "residuals are not finite at the initial point".into(),
        ));
    }
    let mut cost = r.norm_squared();

    if p == 0 {
        return Ok(LmReport {
            x,
            residuals: r,
            cost,
            jacobian: None,
            nfev,
            iterations: 0,
            converged: true,
            message: "no free parameters".into(),
        });
    }
    if r.len() < p {
        return Err(AnalysisError::Optimization(format!(
            "{} residuals cannot determine {p} free parameters",
            r.len()
        )));
    }

    let mut lambda = opts.initial_lambda.max(LAMBDA_MIN);
    let mut iterations = 0usize;
    let mut converged = false;
    let mut message = String::from("maximum number of function evaluations reached");

    'outer: while nfev + p < budget {
        iterations += 1;
        let jac = jacobian(&residual_fn, &x, &r, bounds, opts.diff_step)?;
        nfev += p;

        let jtj = jac.transpose() * &jac;
        let grad = jac.transpose() * &r;

        if grad.amax() <= opts.gtol {
            converged = true;
            message = "gradient is below tolerance".into();
            break;
        }

        loop {
            if nfev >= budget {
                break 'outer;
            }
            if lambda > LAMBDA_MAX {
                // No damping produces a decrease: we are at a numerical minimum.
                converged = true;
                message = "no further reduction in the sum of squares".into();
                break 'outer;
            }

            let Some(delta) = damped_step(&jtj, &grad, lambda) else {
                lambda *= 10.0;
                continue;
            };

            let trial: Vec<f64> = project(
                &x.iter().zip(delta.iter()).map(|(xi, di)| xi + di).collect::<Vec<_>>(),
                bounds,
            );
            nfev += 1;
            let r_trial = match residual_fn(&trial) {
                Ok(r_trial) if all_finite(&r_trial) => r_trial,
                _ => {
                    lambda *= 10.0;
                    continue;
                }
            };

            let cost_trial = r_trial.norm_squared();
            if cost_trial < cost {
                let step_norm = trial
                    .iter()
                    .zip(x.iter())
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum::<f64>()
                    .sqrt();
                let x_norm = x.iter().map(|v| v * v).sum::<f64>().sqrt();
                let rel_reduction = (cost - cost_trial) / cost;

                x = trial;
                r = r_trial;
                cost = cost_trial;
                lambda = (lambda / 10.0).max(LAMBDA_MIN);

                if cost == 0.0 || rel_reduction <= opts.ftol {
                    converged = true;
                    message = "relative reduction in the sum of squares is below tolerance".into();
                    break 'outer;
                }
                if step_norm <= opts.xtol * (x_norm + opts.xtol) {
                    converged = true;
                    message = "relative step size is below tolerance".into();
                    break 'outer;
                }
                break;
            }

            lambda *= 10.0;
        }
    }

    log::debug!(
        "levenberg-marquardt: converged={converged} iterations={iterations} nfev={nfev} cost={cost:.6e} ({message})"
    );

    let jac = jacobian(&residual_fn, &x, &r, bounds, opts.diff_step)?;
    nfev += p;

    Ok(LmReport {
        x,
        residuals: r,
        cost,
        jacobian: Some(jac),
        nfev,
        iterations,
        converged,
        message,
    })
}

/// Parameter covariance `σ² (JᵀJ)⁻¹` with `σ² = cost / (n - p)`.
///
/// Returns `None` when there are no degrees of freedom left or `JᵀJ` is singular.
pub fn covariance(jacobian: &DMatrix<f64>, cost: f64) -> Option<DMatrix<f64>> {
    let (n, p) = jacobian.shape();
    if p == 0 || n <= p {
        return None;
    }
    let jtj = jacobian.transpose() * jacobian;
    let inv = jtj.try_inverse()?;
    let scaled = inv * (cost / (n - p) as f64);
    scaled.iter().all(|v| v.is_finite()).then_some(scaled)
}

fn damped_step(jtj: &DMatrix<f64>, grad: &DVector<f64>, lambda: f64) -> Option<DVector<f64>> {
    let mut m = jtj.clone();
    for j in 0..m.nrows() {
        let d = jtj[(j, j)].max(f64::EPSILON);
        m[(j, j)] += lambda * d;
    }
    let rhs = -grad;

    let delta = match m.clone().cholesky() {
        Some(chol) => chol.solve(&rhs),
        None => solve_least_squares(&m, &rhs)?,
    };
    delta.iter().all(|v| v.is_finite()).then_some(delta)
}

fn jacobian<F>(
    residual_fn: &F,
    x: &[f64],
    r0: &DVector<f64>,
    bounds: &[(f64, f64)],
    diff_step: f64,
) -> Result<DMatrix<f64>, AnalysisError>
where
    F: Fn(&[f64]) -> Result<DVector<f64>, AnalysisError> + Sync,
{
    let columns: Vec<DVector<f64>> = (0..x.len())
        .into_par_iter()
        .map(|j| {
            let mut h = diff_step * x[j].abs().max(1.0);
            // Step backwards when a forward step would leave the box.
            if x[j] + h > bounds[j].1 {
                h = -h;
            }
            let mut xp = x.to_vec();
            xp[j] += h;
            let rp = residual_fn(&xp)?;
            let col = (rp - r0) / h;
            if all_finite(&col) {
                Ok(col)
            } else {
                Err(AnalysisError::Optimization(format!(
                    "non-finite derivative for parameter {j}"
                )))
            }
        })
        .collect::<Result<_, _>>()?;

    Ok(DMatrix::from_columns(&columns))
}

/// Clamp into the box. NaN stays NaN so the caller's finiteness checks see it.
fn project(x: &[f64], bounds: &[(f64, f64)]) -> Vec<f64> {
    x.iter()
        .zip(bounds.iter())
        .map(|(&v, &(lo, hi))| v.clamp(lo, hi))
        .collect()
}

fn all_finite(v: &DVector<f64>) -> bool {
    v.iter().all(|x| x.is_finite())
}

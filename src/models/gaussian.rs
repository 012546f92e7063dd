//! Gaussian peak: `A·exp(-(x - x0)² / (2σ²)) + offset`.

use crate::domain::{Coordinates, Dataset};
use crate::error::AnalysisError;
use crate::math::{argmax, mean_spacing, min_max};
use crate::models::{FitModel, eval_1d};

/// `FWHM = 2·sqrt(2·ln 2)·σ`.
const FWHM_PER_SIGMA: f64 = 2.354_820_045_030_949;

#[derive(Debug, Clone, Copy, Default)]
pub struct GaussianModel;

impl FitModel for GaussianModel {
    fn name(&self) -> &str {
        "GaussianFit"
    }

    fn param_names(&self) -> &[&'static str] {
        &["A", "x0", "sigma", "offset"]
    }

    fn model(&self, coords: &Coordinates, params: &[f64]) -> Result<Vec<f64>, AnalysisError> {
        eval_1d(self, coords, params, |x, p| {
            let u = (x - p[1]) / p[2];
            p[0] * (-0.5 * u * u).exp() + p[3]
        })
    }

    /// Baseline at the minimum, peak at the maximum, width from the span of
    /// samples above half maximum.
    fn guess(&self, input: &Dataset) -> Result<Vec<f64>, AnalysisError> {
        let x = input.x_1d(self.name())?;
        let y = input.data();

        let (lo, hi) = min_max(y).ok_or_else(|| AnalysisError::EmptyInput("all data is NaN".into()))?;
        let peak = argmax(y).unwrap_or(0);
        let amplitude = hi - lo;
        let half = lo + amplitude / 2.0;

        let (left, right) = x
            .iter()
            .zip(y.iter())
            .filter(|(_, yi)| **yi >= half)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(l, r), (xi, _)| {
                (l.min(*xi), r.max(*xi))
            });
        let fwhm = right - left;

        let sigma = if fwhm.is_finite() && fwhm > 0.0 {
            fwhm / FWHM_PER_SIGMA
        } else {
            mean_spacing(x).map(f64::abs).filter(|d| *d > 0.0).unwrap_or(1.0)
        };

        Ok(vec![amplitude, x[peak], sigma, lo])
    }
}

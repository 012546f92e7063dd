//! Straight line: `a·x + b`.
//!
//! The guess is the closed-form least-squares line, so the optimizer only has
//! to confirm it (and supply uncertainties).

use crate::domain::{Coordinates, Dataset};
use crate::error::AnalysisError;
use crate::math::fit_line;
use crate::models::{FitModel, eval_1d};

#[derive(Debug, Clone, Copy, Default)]
pub struct LinearModel;

impl FitModel for LinearModel {
    fn name(&self) -> &str {
        "LinearFit"
    }

    fn param_names(&self) -> &[&'static str] {
        &["a", "b"]
    }

    fn model(&self, coords: &Coordinates, params: &[f64]) -> Result<Vec<f64>, AnalysisError> {
        eval_1d(self, coords, params, |x, p| p[0] * x + p[1])
    }

    fn guess(&self, input: &Dataset) -> Result<Vec<f64>, AnalysisError> {
        let x = input.x_1d(self.name())?;
        let (slope, intercept) = fit_line(x, input.data()).ok_or_else(|| {
            AnalysisError::InvalidInput("line guess needs at least 2 distinct, finite points".into())
        })?;
        Ok(vec![slope, intercept])
    }
}

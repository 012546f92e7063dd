//! Exponential decay: `A·exp(-x/τ) + offset`.

use crate::domain::{Coordinates, Dataset};
use crate::error::AnalysisError;
use crate::models::{FitModel, eval_1d};

#[derive(Debug, Clone, Copy, Default)]
pub struct ExpDecayModel;

impl FitModel for ExpDecayModel {
    fn name(&self) -> &str {
        "ExponentialDecayFit"
    }

    fn param_names(&self) -> &[&'static str] {
        &["A", "tau", "offset"]
    }

    fn model(&self, coords: &Coordinates, params: &[f64]) -> Result<Vec<f64>, AnalysisError> {
        eval_1d(self, coords, params, |x, p| p[0] * (-x / p[1]).exp() + p[2])
    }

    /// `offset` is the last sample, `τ` a third of the coordinate span, and `A`
    /// is chosen so the curve passes through the first sample.
    fn guess(&self, input: &Dataset) -> Result<Vec<f64>, AnalysisError> {
        let x = input.x_1d(self.name())?;
        let y = input.data();
        let n = y.len();
        if n < 2 {
            return Err(AnalysisError::InvalidInput(
                "decay guess needs at least 2 samples".into(),
            ));
        }

        let span = x[n - 1] - x[0];
        if !span.is_finite() || span == 0.0 {
            return Err(AnalysisError::InvalidInput(format!(
                "cannot estimate a decay time from coordinate span {span}"
            )));
        }
        let tau = span / 3.0;
        let offset = y[n - 1];

        let amplitude = (y[0] - offset) * (x[0] / tau).exp();
        let amplitude = if amplitude.is_finite() {
            amplitude
        } else {
            y[0] - offset
        };

        Ok(vec![amplitude, tau, offset])
    }
}

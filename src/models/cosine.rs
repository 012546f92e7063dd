//! Cosine model: `A·cos(2π·f·x + φ) + offset`.
//!
//! Guess heuristic:
//! - `offset` = mean of the data
//! - `A` = half the peak-to-peak range
//! - `f`, `φ` from the strongest positive non-zero DFT bin, on the frequency
//!   grid implied by the mean coordinate spacing

use std::f64::consts::PI;

use crate::domain::{Coordinates, Dataset};
use crate::error::AnalysisError;
use crate::math::{dominant_component, mean, mean_spacing, min_max};
use crate::models::{FitModel, eval_1d};

const PARAMS: [&str; 4] = ["A", "f", "phi", "offset"];

#[derive(Debug, Clone, Copy, Default)]
pub struct CosineModel;

impl CosineModel {
    pub fn value(x: f64, amplitude: f64, frequency: f64, phase: f64, offset: f64) -> f64 {
        amplitude * (2.0 * PI * frequency * x + phase).cos() + offset
    }
}

impl FitModel for CosineModel {
    fn name(&self) -> &str {
        "CosineFit"
    }

    fn param_names(&self) -> &[&'static str] {
        &PARAMS
    }

    fn model(&self, coords: &Coordinates, params: &[f64]) -> Result<Vec<f64>, AnalysisError> {
        eval_1d(self, coords, params, |x, p| {
            Self::value(x, p[0], p[1], p[2], p[3])
        })
    }

    fn guess(&self, input: &Dataset) -> Result<Vec<f64>, AnalysisError> {
        let x = input.x_1d(self.name())?;
        let y = input.data();
        if y.len() < 2 {
            return Err(AnalysisError::InvalidInput(
                "cosine guess needs at least 2 samples".into(),
            ));
        }

        let offset = mean(y).unwrap_or(0.0);
        let (lo, hi) = min_max(y).ok_or_else(|| AnalysisError::EmptyInput("all data is NaN".into()))?;
        let amplitude = (hi - lo) / 2.0;

        let dx = mean_spacing(x).unwrap_or(0.0);
        let component = dominant_component(y, dx).ok_or_else(|| {
            AnalysisError::InvalidInput(format!(
                "cannot estimate a frequency from coordinate spacing {dx}"
            ))
        })?;

        Ok(vec![amplitude, component.frequency, component.phase, offset])
    }
}

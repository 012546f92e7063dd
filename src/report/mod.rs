//! Reporting utilities: residual summaries and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::{AnalysisResult, Dataset};
use crate::error::AppError;

/// Residual summary of a model-bearing result against its input data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResidualSummary {
    pub rms: f64,
    pub max_abs: f64,
    /// Index of the largest absolute residual.
    pub worst: usize,
}

/// Compute `model - data` at every input coordinate.
pub fn compute_residuals(result: &AnalysisResult, dataset: &Dataset) -> Result<Vec<f64>, AppError> {
    let fitted = result.eval(dataset.coordinates())?;
    let residuals: Vec<f64> = fitted
        .iter()
        .zip(dataset.data().iter())
        .map(|(m, d)| m - d)
        .collect();
    if residuals.iter().any(|r| !r.is_finite()) {
        return Err(AppError::new(4, "Non-finite model prediction during residual computation."));
    }
    Ok(residuals)
}

pub fn summarize_residuals(residuals: &[f64]) -> Option<ResidualSummary> {
    if residuals.is_empty() {
        return None;
    }
    let rms = (residuals.iter().map(|r| r * r).sum::<f64>() / residuals.len() as f64).sqrt();
    let (worst, max_abs) = residuals
        .iter()
        .map(|r| r.abs())
        .enumerate()
        .fold((0, 0.0), |(bi, bv), (i, v)| if v > bv { (i, v) } else { (bi, bv) });
    Some(ResidualSummary { rms, max_abs, worst })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Analysis, FindMin};
    use crate::fit::Fit;
    use crate::models::LinearModel;

    #[test]
    fn residuals_of_dry_linear_guess() {
        let ds = Dataset::new(vec![0.0, 1.0, 2.0], vec![1.0, 3.0, 5.0]).unwrap();
        let result = Fit::of(LinearModel).dry().run(&ds).unwrap();
        let residuals = compute_residuals(&result, &ds).unwrap();
        assert!(residuals.iter().all(|r| r.abs() < 1e-9));
    }

    #[test]
    fn residuals_need_a_model() {
        let ds = Dataset::new(vec![0.0, 1.0], vec![1.0, 0.0]).unwrap();
        let result = FindMin.run(&ds).unwrap();
        assert_eq!(compute_residuals(&result, &ds).unwrap_err().exit_code(), 4);
    }

    #[test]
    fn summary_picks_worst_point() {
        let s = summarize_residuals(&[0.5, -2.0, 1.0]).unwrap();
        assert_eq!(s.worst, 1);
        assert_eq!(s.max_abs, 2.0);
        assert!((s.rms - (5.25f64 / 3.0).sqrt()).abs() < 1e-12);
        assert!(summarize_residuals(&[]).is_none());
    }
}

//! The fit model contract.

use crate::domain::{Coordinates, Dataset};
use crate::error::AnalysisError;

/// A parametric model that [`crate::fit::Fit`] can optimize against data.
///
/// `param_names` defines the free parameters and their order; `model` and
/// `guess` exchange parameter vectors in exactly that order.
///
/// Both `model` and `guess` have default implementations that fail with
/// [`AnalysisError::NotImplemented`], so a partially written model is
/// rejected at run time with a clear error rather than silently misbehaving.
pub trait FitModel: std::fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn param_names(&self) -> &[&'static str];

    /// Evaluate the model at every coordinate point.
    fn model(&self, coords: &Coordinates, params: &[f64]) -> Result<Vec<f64>, AnalysisError> {
        let _ = (coords, params);
        Err(AnalysisError::not_implemented(self.name(), "model"))
    }

    /// Starting values for the optimizer, derived from the data alone.
    fn guess(&self, input: &Dataset) -> Result<Vec<f64>, AnalysisError> {
        let _ = input;
        Err(AnalysisError::not_implemented(self.name(), "guess"))
    }

    /// Position of `name` in [`FitModel::param_names`].
    fn param_index(&self, name: &str) -> Option<usize> {
        self.param_names().iter().position(|n| *n == name)
    }
}

/// Evaluate a one-dimensional model `f(x, params)` over `coords`.
///
/// Checks the parameter count and that the coordinates are one-dimensional.
pub fn eval_1d<M, F>(
    model: &M,
    coords: &Coordinates,
    params: &[f64],
    f: F,
) -> Result<Vec<f64>, AnalysisError>
where
    M: FitModel + ?Sized,
    F: Fn(f64, &[f64]) -> f64,
{
    let expected = model.param_names().len();
    if params.len() != expected {
        return Err(AnalysisError::LengthMismatch {
            what: format!("{} parameters", model.name()),
            expected,
            actual: params.len(),
        });
    }
    let x = coords
        .as_1d()
        .ok_or_else(|| AnalysisError::DimensionMismatch {
            analysis: model.name().to_string(),
            expected: 1,
            actual: coords.dims(),
        })?;
    Ok(x.iter().map(|&xi| f(xi, params)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Bare;

    impl FitModel for Bare {
        fn name(&self) -> &str {
            "Bare"
        }

        fn param_names(&self) -> &[&'static str] {
            &["k"]
        }
    }

    #[test]
    fn unimplemented_model_and_guess_fail() {
        let coords = Coordinates::from(vec![0.0, 1.0]);
        let ds = Dataset::new(coords.clone(), vec![1.0, 2.0]).unwrap();

        let err = Bare.model(&coords, &[1.0]).unwrap_err();
        assert_eq!(err, AnalysisError::not_implemented("Bare", "model"));

        let err = Bare.guess(&ds).unwrap_err();
        assert_eq!(err, AnalysisError::not_implemented("Bare", "guess"));
    }

    #[test]
    fn eval_1d_checks_parameter_count_and_dims() {
        let coords = Coordinates::from(vec![1.0, 2.0]);
        let y = eval_1d(&Bare, &coords, &[3.0], |x, p| p[0] * x).unwrap();
        assert_eq!(y, vec![3.0, 6.0]);

        assert!(matches!(
            eval_1d(&Bare, &coords, &[1.0, 2.0], |x, _| x),
            Err(AnalysisError::LengthMismatch { .. })
        ));

        let grid = Coordinates::Axes(vec![vec![0.0], vec![1.0]]);
        assert!(matches!(
            eval_1d(&Bare, &grid, &[1.0], |x, _| x),
            Err(AnalysisError::DimensionMismatch { .. })
        ));
        assert_eq!(Bare.param_index("k"), Some(0));
        assert_eq!(Bare.param_index("q"), None);
    }
}

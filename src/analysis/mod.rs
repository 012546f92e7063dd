//! The analysis contract and the discrete (non-fit) analyses.
//!
//! An [`Analysis`] turns a [`Dataset`] into an [`AnalysisResult`]. Callers read
//! the result's named parameters the same way whichever implementation
//! produced them; fits additionally support `eval`.

pub mod extrema;

use crate::domain::{AnalysisKind, AnalysisResult, Dataset, FitConfig};
use crate::error::AnalysisError;
use crate::fit::Fit;
use crate::models::build_model;

pub use extrema::{FindMax, FindMin};

/// A stateless transformation from `(coordinates, data)` to a result.
pub trait Analysis {
    fn name(&self) -> &str;

    /// Compute the result. Implementations must override this; the default
    /// fails with [`AnalysisError::NotImplemented`].
    fn analyze(&self, input: &Dataset) -> Result<AnalysisResult, AnalysisError> {
        let _ = input;
        Err(AnalysisError::not_implemented(self.name(), "analyze"))
    }

    /// Run the analysis on `input`.
    fn run(&self, input: &Dataset) -> Result<AnalysisResult, AnalysisError> {
        log::debug!("running {} on {} points", self.name(), input.len());
        self.analyze(input)
    }
}

/// Construct the analysis selected by `kind`.
///
/// `fit` is only consulted for fit analyses.
pub fn build_analysis(kind: AnalysisKind, fit: FitConfig) -> Box<dyn Analysis> {
    match kind.to_model() {
        Some(model) => Box::new(Fit::new(build_model(model)).with_config(fit)),
        None if kind == AnalysisKind::Min => Box::new(FindMin),
        None => Box::new(FindMax),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unfinished;

    impl Analysis for Unfinished {
        fn name(&self) -> &str {
            "Unfinished"
        }
    }

    #[test]
    fn run_without_analyze_is_not_implemented() {
        let ds = Dataset::new(vec![0.0, 1.0], vec![1.0, 2.0]).unwrap();
        let err = Unfinished.run(&ds).unwrap_err();
        assert_eq!(err, AnalysisError::not_implemented("Unfinished", "analyze"));
    }

    #[test]
    fn build_analysis_picks_implementation() {
        for kind in AnalysisKind::ALL {
            let analysis = build_analysis(kind, FitConfig::default());
            assert_eq!(analysis.name(), kind.display_name());
        }
    }

    #[test]
    fn results_are_read_uniformly() {
        let x: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|xi| 0.5 * xi - 1.0).collect();
        let ds = Dataset::new(x, y).unwrap();

        for kind in [AnalysisKind::Max, AnalysisKind::Linear] {
            let result = build_analysis(kind, FitConfig::default()).run(&ds).unwrap();
            assert!(!result.params().is_empty());
            for p in result.params() {
                assert!(p.value().as_f64().is_some(), "{} on {kind:?}", p.name());
            }
        }
    }
}

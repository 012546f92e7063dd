//! Analysis results.
//!
//! Every analysis returns an [`AnalysisResult`]: a [`ParameterSet`] that all
//! consumers can read the same way, plus, for fits, a [`FitOutcome`] that keeps
//! the model so the result can be evaluated on new coordinates.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::{Coordinates, FitMode, ParamValue, Parameter, ParameterSet};
use crate::error::AnalysisError;
use crate::models::FitModel;

/// Goodness-of-fit statistics reported by an optimized fit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitStats {
    pub ndata: usize,
    pub nvarys: usize,
    pub nfev: usize,
    pub iterations: usize,
    /// Sum of squared residuals.
    pub chisqr: f64,
    /// `chisqr / (ndata - nvarys)`.
    pub redchi: f64,
    pub aic: f64,
    pub bic: f64,
    pub rsquared: f64,
    pub success: bool,
    pub message: String,
}

/// The model-bearing part of a fit result.
#[derive(Debug, Clone)]
pub struct FitOutcome {
    model: Arc<dyn FitModel>,
    mode: FitMode,
    init_values: Vec<f64>,
    best_values: Vec<f64>,
    stats: Option<FitStats>,
}

impl FitOutcome {
    /// Outcome of a dry run: the best values are the initial ones.
    pub fn dry(model: Arc<dyn FitModel>, init_values: Vec<f64>) -> Self {
        Self {
            model,
            mode: FitMode::Dry,
            best_values: init_values.clone(),
            init_values,
            stats: None,
        }
    }

    pub fn optimized(
        model: Arc<dyn FitModel>,
        init_values: Vec<f64>,
        best_values: Vec<f64>,
        stats: FitStats,
    ) -> Self {
        Self {
            model,
            mode: FitMode::Optimize,
            init_values,
            best_values,
            stats: Some(stats),
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn mode(&self) -> FitMode {
        self.mode
    }

    pub fn param_names(&self) -> &[&'static str] {
        self.model.param_names()
    }

    pub fn init_values(&self) -> &[f64] {
        &self.init_values
    }

    pub fn best_values(&self) -> &[f64] {
        &self.best_values
    }

    /// Statistics; `None` for dry runs.
    pub fn stats(&self) -> Option<&FitStats> {
        self.stats.as_ref()
    }

    pub fn success(&self) -> bool {
        self.stats.as_ref().is_some_and(|s| s.success)
    }

    pub fn eval(&self, coords: &Coordinates) -> Result<Vec<f64>, AnalysisError> {
        self.model.model(coords, &self.best_values)
    }
}

/// Uniform output of every analysis.
#[derive(Debug, Clone, Default)]
pub struct AnalysisResult {
    params: ParameterSet,
    fit: Option<FitOutcome>,
}

impl AnalysisResult {
    pub fn new(params: ParameterSet) -> Self {
        Self { params, fit: None }
    }

    pub fn with_fit(params: ParameterSet, fit: FitOutcome) -> Self {
        Self {
            params,
            fit: Some(fit),
        }
    }

    /// Build a result from a JSON object of named outputs.
    ///
    /// Each entry is either a raw value (`"a": 3`) or an attribute object
    /// (`"b": {"value": 4, "stderr": 0.1}`); both become parameters. An
    /// attribute object without `value` yields a `Null` value.
    pub fn from_outputs(outputs: serde_json::Value) -> Result<Self, AnalysisError> {
        let serde_json::Value::Object(entries) = outputs else {
            return Err(AnalysisError::InvalidOutputs(format!(
                "expected an object of named outputs, got {outputs}"
            )));
        };

        let mut params = ParameterSet::new();
        for (name, entry) in &entries {
            let param = match entry {
                serde_json::Value::Object(attrs) => attrs.iter().filter(|(k, _)| *k != "value").fold(
                    Parameter::new(
                        name.as_str(),
                        attrs.get("value").map_or(ParamValue::Null, ParamValue::from_json),
                    ),
                    |p, (k, v)| p.with_attr(k.as_str(), ParamValue::from_json(v)),
                ),
                raw => Parameter::new(name.as_str(), ParamValue::from_json(raw)),
            };
            params.insert(param);
        }

        Ok(Self::new(params))
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    pub fn fit(&self) -> Option<&FitOutcome> {
        self.fit.as_ref()
    }

    /// Whether [`AnalysisResult::eval`] is available.
    pub fn can_eval(&self) -> bool {
        self.fit.is_some()
    }

    /// Evaluate the underlying model at the result's parameter values.
    ///
    /// Only analyses with a continuous model (fits) support this; discrete
    /// analyses fail with [`AnalysisError::NotImplemented`].
    pub fn eval(&self, coords: &Coordinates) -> Result<Vec<f64>, AnalysisError> {
        self.outcome()?.eval(coords)
    }

    /// Evaluate the model with some parameters replaced by name.
    pub fn eval_with(
        &self,
        coords: &Coordinates,
        replace: &[(&str, f64)],
    ) -> Result<Vec<f64>, AnalysisError> {
        let outcome = self.outcome()?;
        let mut values = outcome.best_values.clone();
        for (name, value) in replace {
            let idx = outcome
                .model
                .param_index(name)
                .ok_or_else(|| AnalysisError::UnknownParameter(name.to_string()))?;
            values[idx] = *value;
        }
        outcome.model.model(coords, &values)
    }

    fn outcome(&self) -> Result<&FitOutcome, AnalysisError> {
        self.fit
            .as_ref()
            .ok_or_else(|| AnalysisError::not_implemented("AnalysisResult", "eval"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LinearModel;
    use serde_json::json;

    #[test]
    fn from_outputs_normalizes_raw_and_nested_entries() {
        let result = AnalysisResult::from_outputs(json!({
            "b": {"value": 4, "stderr": 0.1},
            "a": 3,
        }))
        .unwrap();

        let params = result.params();
        assert_eq!(params.len(), 2);
        assert_eq!(params.value("a").unwrap(), 3.0);
        assert_eq!(params.value("b").unwrap(), 4.0);
        assert_eq!(params.get("b").unwrap().attr_f64("stderr").unwrap(), 0.1);
        assert!(params.get("b").unwrap().attr("value").is_err());
        assert_eq!(params.names().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn from_outputs_without_value_is_null() {
        let result = AnalysisResult::from_outputs(json!({"c": {"stderr": 1.0}})).unwrap();
        let c = result.params().get("c").unwrap();
        assert!(c.value().is_null());
        assert_eq!(c.stderr(), Some(1.0));
    }

    #[test]
    fn from_outputs_rejects_non_objects() {
        assert!(matches!(
            AnalysisResult::from_outputs(json!([1, 2])),
            Err(AnalysisError::InvalidOutputs(_))
        ));
    }

    #[test]
    fn eval_requires_a_model() {
        let result = AnalysisResult::new(ParameterSet::new());
        assert!(!result.can_eval());
        let err = result.eval(&Coordinates::from(vec![0.0])).unwrap_err();
        assert!(matches!(err, AnalysisError::NotImplemented { .. }));
    }

    #[test]
    fn eval_with_replaces_named_values() {
        let outcome = FitOutcome::dry(Arc::new(LinearModel), vec![2.0, 1.0]);
        let result = AnalysisResult::with_fit(ParameterSet::new(), outcome);
        let coords = Coordinates::from(vec![0.0, 1.0]);

        assert_eq!(result.eval(&coords).unwrap(), vec![1.0, 3.0]);
        assert_eq!(result.eval_with(&coords, &[("b", 0.0)]).unwrap(), vec![0.0, 2.0]);
        assert!(matches!(
            result.eval_with(&coords, &[("zz", 0.0)]),
            Err(AnalysisError::UnknownParameter(_))
        ));
        assert!(!result.fit().unwrap().success());
    }
}

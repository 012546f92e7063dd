//! [`Fit`]: an [`Analysis`] that estimates the parameters of a [`FitModel`].
//!
//! Given:
//! - coordinates `x_i` and observed values `y_i`
//! - a model `m(x; p)` with named parameters
//!
//! we minimize `Σ (m(x_i; p) - y_i)^2` over the parameters left free by the
//! caller's overrides, starting from the model's guess.

use std::sync::Arc;

use nalgebra::DVector;

use crate::analysis::Analysis;
use crate::domain::{
    AnalysisResult, Dataset, FitConfig, FitMode, FitOutcome, FitStats, ParamHint, ParamValue,
    Parameter, ParameterSet,
};
use crate::error::AnalysisError;
use crate::math::{covariance, minimize, total_sum_of_squares};
use crate::models::FitModel;

/// Floor for the sum of squares inside the information criteria (`ln(0)`).
const CHISQR_FLOOR: f64 = 1e-250;

/// A fit of one model, configured once and run once.
#[derive(Debug, Clone)]
pub struct Fit {
    model: Arc<dyn FitModel>,
    config: FitConfig,
}

/// Starting point after guess + overrides.
#[derive(Debug, Clone)]
struct Seed {
    values: Vec<f64>,
    vary: Vec<bool>,
    bounds: Vec<(f64, f64)>,
}

impl Fit {
    pub fn new(model: Arc<dyn FitModel>) -> Self {
        Self {
            model,
            config: FitConfig::default(),
        }
    }

    /// Convenience for `Fit::new(Arc::new(model))`.
    pub fn of(model: impl FitModel + 'static) -> Self {
        Self::new(Arc::new(model))
    }

    pub fn with_config(mut self, config: FitConfig) -> Self {
        self.config = config;
        self
    }

    /// Only evaluate the initial guess; skip optimization.
    pub fn dry(mut self) -> Self {
        self.config.mode = FitMode::Dry;
        self
    }

    pub fn with_override(mut self, name: impl Into<String>, hint: ParamHint) -> Self {
        self.config.set_override(name, hint);
        self
    }

    fn seed(&self, input: &Dataset) -> Result<Seed, AnalysisError> {
        let names = self.model.param_names();
        let mut values = self.model.guess(input)?;
        if values.len() != names.len() {
            return Err(AnalysisError::LengthMismatch {
                what: format!("{} guess", self.model.name()),
                expected: names.len(),
                actual: values.len(),
            });
        }

        let mut vary = vec![true; names.len()];
        let mut bounds = vec![(f64::NEG_INFINITY, f64::INFINITY); names.len()];

        for (name, hint) in &self.config.overrides {
            let idx = self
                .model
                .param_index(name)
                .ok_or_else(|| AnalysisError::UnknownParameter(name.clone()))?;
            if let Some(v) = hint.value {
                values[idx] = v;
            }
            vary[idx] = hint.vary;
            let lo = hint.min.unwrap_or(f64::NEG_INFINITY);
            let hi = hint.max.unwrap_or(f64::INFINITY);
            if lo.is_nan() || hi.is_nan() || lo > hi {
                return Err(AnalysisError::InvalidInput(format!(
                    "invalid bounds for '{name}': [{lo}, {hi}]"
                )));
            }
            bounds[idx] = (lo, hi);
        }

        for (i, name) in names.iter().enumerate() {
            if !values[i].is_finite() {
                return Err(AnalysisError::InvalidInput(format!(
                    "initial value for '{name}' is not finite ({}); check the data for NaN or set it explicitly",
                    values[i]
                )));
            }
            let (lo, hi) = bounds[i];
            values[i] = values[i].clamp(lo, hi);
            // A zero-width box pins the parameter.
            if lo == hi {
                vary[i] = false;
            }
        }

        Ok(Seed {
            values,
            vary,
            bounds,
        })
    }

    fn dry_result(&self, seed: Seed) -> AnalysisResult {
        let params = self.build_params(&seed, &seed.values, None);
        AnalysisResult::with_fit(params, FitOutcome::dry(Arc::clone(&self.model), seed.values))
    }

    fn optimize(&self, input: &Dataset, seed: Seed) -> Result<AnalysisResult, AnalysisError> {
        let free: Vec<usize> = (0..seed.values.len()).filter(|&i| seed.vary[i]).collect();
        let x0: Vec<f64> = free.iter().map(|&i| seed.values[i]).collect();
        let free_bounds: Vec<(f64, f64)> = free.iter().map(|&i| seed.bounds[i]).collect();

        let coords = input.coordinates();
        let data = input.data();
        let model = &self.model;
        let full_values = |x: &[f64]| {
            let mut full = seed.values.clone();
            for (k, &i) in free.iter().enumerate() {
                full[i] = x[k];
            }
            full
        };
        let residual_fn = |x: &[f64]| -> Result<DVector<f64>, AnalysisError> {
            let predicted = model.model(coords, &full_values(x))?;
            if predicted.len() != data.len() {
                return Err(AnalysisError::LengthMismatch {
                    what: format!("{} output", model.name()),
                    expected: data.len(),
                    actual: predicted.len(),
                });
            }
            Ok(DVector::from_iterator(
                data.len(),
                predicted.iter().zip(data.iter()).map(|(m, d)| m - d),
            ))
        };

        let report = minimize(residual_fn, &x0, &free_bounds, &self.config.options)?;
        let best = full_values(&report.x);

        let covar = report
            .jacobian
            .as_ref()
            .and_then(|jac| covariance(jac, report.cost));
        let stderr: Vec<Option<f64>> = (0..best.len())
            .map(|i| {
                let k = free.iter().position(|&f| f == i)?;
                let var = covar.as_ref()?[(k, k)];
                (var >= 0.0).then(|| var.sqrt())
            })
            .collect();

        let stats = fit_stats(data, free.len(), &report);
        log::debug!(
            "{}: success={} chisqr={:.6e} nfev={}",
            model.name(),
            stats.success,
            stats.chisqr,
            stats.nfev
        );

        let params = self.build_params(&seed, &best, Some(&stderr));
        Ok(AnalysisResult::with_fit(
            params,
            FitOutcome::optimized(Arc::clone(model), seed.values, best, stats),
        ))
    }

    fn build_params(&self, seed: &Seed, values: &[f64], stderr: Option<&[Option<f64>]>) -> ParameterSet {
        let mut params = ParameterSet::new();
        for (i, name) in self.model.param_names().iter().enumerate() {
            let mut p = Parameter::new(*name, values[i])
                .with_attr("init_value", seed.values[i])
                .with_attr("vary", seed.vary[i]);
            let (lo, hi) = seed.bounds[i];
            if lo.is_finite() {
                p = p.with_attr("min", lo);
            }
            if hi.is_finite() {
                p = p.with_attr("max", hi);
            }
            if let Some(err) = stderr.and_then(|s| s[i]) {
                p = p.with_attr("stderr", err);
            }
            params.insert(p);
        }
        params
    }
}

impl Analysis for Fit {
    fn name(&self) -> &str {
        self.model.name()
    }

    fn analyze(&self, input: &Dataset) -> Result<AnalysisResult, AnalysisError> {
        let seed = self.seed(input)?;
        match self.config.mode {
            FitMode::Dry => Ok(self.dry_result(seed)),
            FitMode::Optimize => self.optimize(input, seed),
        }
    }
}

fn fit_stats(data: &[f64], nvarys: usize, report: &crate::math::LmReport) -> FitStats {
    let ndata = data.len();
    let n = ndata as f64;
    let chisqr = report.cost;
    let redchi = if ndata > nvarys {
        chisqr / (ndata - nvarys) as f64
    } else {
        f64::NAN
    };
    let log_like = n * (chisqr.max(CHISQR_FLOOR) / n).ln();
    let tss = total_sum_of_squares(data);
    let rsquared = if tss > 0.0 { 1.0 - chisqr / tss } else { f64::NAN };

    FitStats {
        ndata,
        nvarys,
        nfev: report.nfev,
        iterations: report.iterations,
        chisqr,
        redchi,
        aic: log_like + 2.0 * nvarys as f64,
        bic: log_like + n.ln() * nvarys as f64,
        rsquared,
        success: report.converged,
        message: report.message.clone(),
    }
}

/// Numeric value of a fit parameter attribute, if present (helper for reports).
pub fn attr_or_none(param: &Parameter, key: &str) -> Option<f64> {
    param.attr(key).ok().and_then(ParamValue::as_f64)
}

//! Synthetic datasets: a model evaluated on a grid plus seeded Gaussian noise.
//!
//! Used by `anafit synth` and by tests that need realistic noisy inputs.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{Coordinates, Dataset, ModelKind, SynthConfig};
use crate::error::{AnalysisError, AppError};
use crate::models::{FitModel, build_model};

/// Default parameter values for each bundled shape, in `param_names` order.
pub fn default_params(shape: ModelKind) -> Vec<f64> {
    match shape {
        ModelKind::Cosine => vec![1.0, 1.0, 0.0, 0.0],
        ModelKind::Linear => vec![1.0, 0.0],
        ModelKind::ExpDecay => vec![1.0, 1.0, 0.0],
        ModelKind::Gaussian => vec![1.0, 0.0, 1.0, 0.0],
    }
}

/// `n` evenly spaced points from `min` to `max` inclusive.
pub fn linspace(min: f64, max: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![min],
        _ => {
            let step = (max - min) / (n as f64 - 1.0);
            (0..n).map(|i| min + step * i as f64).collect()
        }
    }
}

/// Evaluate `model` at `x` and add `N(0, noise²)` noise from a seeded RNG.
pub fn synthesize(
    model: &dyn FitModel,
    params: &[f64],
    x: Vec<f64>,
    noise: f64,
    seed: u64,
) -> Result<Dataset, AnalysisError> {
    let coords = Coordinates::from(x);
    let clean = model.model(&coords, params)?;

    let normal = Normal::new(0.0, noise)
        .map_err(|e| AnalysisError::InvalidInput(format!("noise distribution error: {e}")))?;
    let mut rng = StdRng::seed_from_u64(seed);
    let noisy = clean
        .into_iter()
        .map(|y| y + normal.sample(&mut rng))
        .collect();

    Dataset::new(coords, noisy)
}

/// Generate the dataset described by a `SynthConfig`.
pub fn generate(config: &SynthConfig) -> Result<Dataset, AppError> {
    if config.n < 2 {
        return Err(AppError::new(2, "Sample count must be >= 2."));
    }
    if !(config.x_min.is_finite() && config.x_max.is_finite() && config.x_max > config.x_min) {
        return Err(AppError::new(
            2,
            format!("Invalid x range: [{}, {}].", config.x_min, config.x_max),
        ));
    }
    if !(config.noise.is_finite() && config.noise >= 0.0) {
        return Err(AppError::new(2, "Noise must be finite and >= 0."));
    }

    let model = build_model(config.shape);
    let mut params = default_params(config.shape);
    for (name, value) in &config.params {
        let idx = model.param_index(name).ok_or_else(|| {
            AppError::new(
                2,
                format!(
                    "Unknown parameter '{name}' for {} (expected one of: {}).",
                    model.name(),
                    model.param_names().join(", ")
                ),
            )
        })?;
        params[idx] = *value;
    }

    let x = linspace(config.x_min, config.x_max, config.n);
    let ds = synthesize(model.as_ref(), &params, x, config.noise, config.seed)?;
    log::debug!(
        "synthesized {} points of {} with params {:?}",
        ds.len(),
        model.name(),
        params
    );
    Ok(ds)
}

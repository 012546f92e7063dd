//! Shared domain types.
//!
//! This module defines:
//!
//! - analysis inputs (`Coordinates`, `Dataset`)
//! - selection enums used by the CLI (`AnalysisKind`, `ModelKind`)
//! - fit configuration (`FitMode`, `ParamHint`, `FitConfig`)
//! - run configuration derived from CLI flags (`RunConfig`, `SynthConfig`)

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::ParamValue;
use crate::error::AnalysisError;
use crate::math::LmOptions;

/// Independent-variable values for a dataset.
///
/// `Axis` is the common one-dimensional case. `Axes` holds one ordered sequence
/// per dimension; every axis has one value per data point (a flattened grid).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coordinates {
    Axis(Vec<f64>),
    Axes(Vec<Vec<f64>>),
}

impl Coordinates {
    /// Number of dimensions.
    pub fn dims(&self) -> usize {
        match self {
            Coordinates::Axis(_) => 1,
            Coordinates::Axes(axes) => axes.len(),
        }
    }

    /// Number of points (length of each axis).
    pub fn len(&self) -> usize {
        match self {
            Coordinates::Axis(x) => x.len(),
            Coordinates::Axes(axes) => axes.first().map_or(0, Vec::len),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn axis(&self, dim: usize) -> Option<&[f64]> {
        match self {
            Coordinates::Axis(x) if dim == 0 => Some(x),
            Coordinates::Axis(_) => None,
            Coordinates::Axes(axes) => axes.get(dim).map(Vec::as_slice),
        }
    }

    /// The single axis, if the coordinates are one-dimensional.
    pub fn as_1d(&self) -> Option<&[f64]> {
        match self {
            Coordinates::Axis(x) => Some(x),
            Coordinates::Axes(axes) if axes.len() == 1 => Some(&axes[0]),
            Coordinates::Axes(_) => None,
        }
    }

    /// Coordinate of point `idx`: a number for 1-D inputs, one value per axis otherwise.
    pub fn point(&self, idx: usize) -> Option<ParamValue> {
        match self.as_1d() {
            Some(x) => x.get(idx).map(|&v| ParamValue::Number(v)),
            None => {
                let Coordinates::Axes(axes) = self else {
                    return None;
                };
                axes.iter()
                    .map(|axis| axis.get(idx).copied())
                    .collect::<Option<Vec<f64>>>()
                    .map(ParamValue::Array)
            }
        }
    }
}

impl From<Vec<f64>> for Coordinates {
    fn from(x: Vec<f64>) -> Self {
        Coordinates::Axis(x)
    }
}

impl From<&[f64]> for Coordinates {
    fn from(x: &[f64]) -> Self {
        Coordinates::Axis(x.to_vec())
    }
}

/// Coordinates plus observed data, validated to have matching lengths.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    coordinates: Coordinates,
    data: Vec<f64>,
}

impl Dataset {
    pub fn new(coordinates: impl Into<Coordinates>, data: Vec<f64>) -> Result<Self, AnalysisError> {
        let coordinates = coordinates.into();
        if data.is_empty() {
            return Err(AnalysisError::EmptyInput("data has no values".into()));
        }
        if coordinates.dims() == 0 {
            return Err(AnalysisError::EmptyInput("coordinates have no axes".into()));
        }
        for dim in 0..coordinates.dims() {
            let len = coordinates.axis(dim).map_or(0, <[f64]>::len);
            if len != data.len() {
                return Err(AnalysisError::LengthMismatch {
                    what: format!("coordinate axis {dim}"),
                    expected: data.len(),
                    actual: len,
                });
            }
        }
        Ok(Self { coordinates, data })
    }

    pub fn coordinates(&self) -> &Coordinates {
        &self.coordinates
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The one-dimensional coordinate axis, or a `DimensionMismatch` naming `analysis`.
    pub fn x_1d(&self, analysis: &str) -> Result<&[f64], AnalysisError> {
        self.coordinates
            .as_1d()
            .ok_or_else(|| AnalysisError::DimensionMismatch {
                analysis: analysis.to_string(),
                expected: 1,
                actual: self.coordinates.dims(),
            })
    }
}

/// Fit model families bundled with the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ModelKind {
    Cosine,
    Linear,
    ExpDecay,
    Gaussian,
}

impl ModelKind {
    pub const ALL: [ModelKind; 4] = [
        ModelKind::Cosine,
        ModelKind::Linear,
        ModelKind::ExpDecay,
        ModelKind::Gaussian,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::Cosine => "CosineFit",
            ModelKind::Linear => "LinearFit",
            ModelKind::ExpDecay => "ExponentialDecayFit",
            ModelKind::Gaussian => "GaussianFit",
        }
    }
}

/// Every analysis selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisKind {
    Max,
    Min,
    Cosine,
    Linear,
    ExpDecay,
    Gaussian,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 6] = [
        AnalysisKind::Max,
        AnalysisKind::Min,
        AnalysisKind::Cosine,
        AnalysisKind::Linear,
        AnalysisKind::ExpDecay,
        AnalysisKind::Gaussian,
    ];

    /// The fit model behind this analysis, if it is a fit.
    pub fn to_model(self) -> Option<ModelKind> {
        match self {
            AnalysisKind::Max | AnalysisKind::Min => None,
            AnalysisKind::Cosine => Some(ModelKind::Cosine),
            AnalysisKind::Linear => Some(ModelKind::Linear),
            AnalysisKind::ExpDecay => Some(ModelKind::ExpDecay),
            AnalysisKind::Gaussian => Some(ModelKind::Gaussian),
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            AnalysisKind::Max => "FindMax",
            AnalysisKind::Min => "FindMin",
            AnalysisKind::Cosine
            | AnalysisKind::Linear
            | AnalysisKind::ExpDecay
            | AnalysisKind::Gaussian => self.to_model().map_or("", ModelKind::display_name),
        }
    }
}

impl From<ModelKind> for AnalysisKind {
    fn from(value: ModelKind) -> Self {
        match value {
            ModelKind::Cosine => AnalysisKind::Cosine,
            ModelKind::Linear => AnalysisKind::Linear,
            ModelKind::ExpDecay => AnalysisKind::ExpDecay,
            ModelKind::Gaussian => AnalysisKind::Gaussian,
        }
    }
}

/// Whether a fit runs the optimizer or only reports its initial guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    #[default]
    Optimize,
    /// Evaluate the guess (plus overrides) without optimization.
    Dry,
}

/// Caller-supplied adjustment to one fit parameter.
///
/// Every field is optional; unset fields keep the model's guess and leave the
/// parameter free and unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamHint {
    pub value: Option<f64>,
    pub vary: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Default for ParamHint {
    fn default() -> Self {
        Self {
            value: None,
            vary: true,
            min: None,
            max: None,
        }
    }
}

impl ParamHint {
    /// Override the starting value.
    pub fn value(value: f64) -> Self {
        Self {
            value: Some(value),
            ..Self::default()
        }
    }

    /// Pin the parameter at `value`; the optimizer does not move it.
    pub fn fixed(value: f64) -> Self {
        Self {
            value: Some(value),
            vary: false,
            ..Self::default()
        }
    }

    pub fn with_bounds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }
}

/// Fit configuration.
#[derive(Debug, Clone, Default)]
pub struct FitConfig {
    pub mode: FitMode,
    /// Per-parameter overrides as `(name, hint)` pairs, applied in order on top
    /// of the guess. Names are unique; see [`FitConfig::with_override`].
    pub overrides: Vec<(String, ParamHint)>,
    pub options: LmOptions,
}

impl FitConfig {
    /// Add or replace the override for `name`.
    pub fn with_override(mut self, name: impl Into<String>, hint: ParamHint) -> Self {
        self.set_override(name, hint);
        self
    }

    pub fn set_override(&mut self, name: impl Into<String>, hint: ParamHint) {
        let name = name.into();
        match self.overrides.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = hint,
            None => self.overrides.push((name, hint)),
        }
    }

    /// Mutable access to the override for `name`, inserting a default one if absent.
    pub fn override_mut(&mut self, name: &str) -> &mut ParamHint {
        let idx = match self.overrides.iter().position(|(n, _)| n == name) {
            Some(idx) => idx,
            None => {
                self.overrides.push((name.to_string(), ParamHint::default()));
                self.overrides.len() - 1
            }
        };
        &mut self.overrides[idx].1
    }
}

/// A full `anafit run` configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    pub x_column: String,
    pub y_column: String,
    pub analysis: AnalysisKind,
    pub fit: FitConfig,
    pub export_json: Option<PathBuf>,
    pub export_curve: Option<PathBuf>,
    /// Number of points in the exported evaluated curve.
    pub curve_points: usize,
}

/// Configuration for synthetic dataset generation.
#[derive(Debug, Clone)]
pub struct SynthConfig {
    pub shape: ModelKind,
    pub n: usize,
    pub x_min: f64,
    pub x_max: f64,
    /// Standard deviation of additive Gaussian noise.
    pub noise: f64,
    pub seed: u64,
    /// Model parameters, by name; missing names use the shape's defaults.
    pub params: Vec<(String, f64)>,
    pub output: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_rejects_mismatched_lengths() {
        let err = Dataset::new(vec![0.0, 1.0], vec![1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::LengthMismatch {
                expected: 3,
                actual: 2,
                ..
            }
        ));
    }

    #[test]
    fn dataset_rejects_empty_data() {
        let err = Dataset::new(Vec::<f64>::new(), vec![]).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyInput(_)));
    }

    #[test]
    fn multi_axis_points_are_arrays() {
        let coords = Coordinates::Axes(vec![vec![0.0, 1.0], vec![10.0, 20.0]]);
        let ds = Dataset::new(coords, vec![5.0, 6.0]).unwrap();
        assert_eq!(ds.coordinates().dims(), 2);
        assert_eq!(
            ds.coordinates().point(1),
            Some(ParamValue::Array(vec![1.0, 20.0]))
        );
        assert!(ds.x_1d("test").is_err());
    }

    #[test]
    fn single_axis_collection_counts_as_1d() {
        let coords = Coordinates::Axes(vec![vec![0.0, 1.0, 2.0]]);
        let ds = Dataset::new(coords, vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(ds.x_1d("test").unwrap(), &[0.0, 1.0, 2.0]);
        assert_eq!(ds.coordinates().point(2), Some(ParamValue::Number(2.0)));
    }

    #[test]
    fn overrides_replace_by_name() {
        let mut cfg = FitConfig::default()
            .with_override("A", ParamHint::value(1.0))
            .with_override("f", ParamHint::value(2.0))
            .with_override("A", ParamHint::fixed(3.0));
        assert_eq!(cfg.overrides.len(), 2);
        assert_eq!(cfg.overrides[0].0, "A");
        assert_eq!(cfg.overrides[0].1, ParamHint::fixed(3.0));

        cfg.override_mut("offset").min = Some(0.0);
        assert_eq!(cfg.overrides.len(), 3);
        assert_eq!(cfg.overrides[2].1.min, Some(0.0));
        assert!(cfg.overrides[2].1.vary);
    }

    #[test]
    fn analysis_kind_maps_to_models() {
        assert_eq!(AnalysisKind::Max.to_model(), None);
        for kind in ModelKind::ALL {
            assert_eq!(AnalysisKind::from(kind).to_model(), Some(kind));
        }
        assert_eq!(AnalysisKind::Cosine.display_name(), "CosineFit");
    }
}

//! Exports.
//!
//! - result JSON: parameters, fit mode and statistics, run metadata
//! - dataset CSV: `x,y` (written by `anafit synth`, readable by `anafit run`)
//! - curve CSV: the fitted model sampled on an even grid, for quick plotting

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::domain::{AnalysisResult, Coordinates, Dataset, FitMode, FitStats, ParameterSet};
use crate::error::AppError;

/// The JSON document written by `--export-json`.
#[derive(Debug, Clone, Serialize)]
pub struct ResultFile {
    pub tool: String,
    pub generated: DateTime<Local>,
    pub analysis: String,
    pub params: ParameterSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fit: Option<FitSection>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FitSection {
    pub mode: FitMode,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<FitStats>,
}

impl ResultFile {
    pub fn new(analysis: &str, result: &AnalysisResult) -> Self {
        Self {
            tool: "anafit".to_string(),
            generated: Local::now(),
            analysis: analysis.to_string(),
            params: result.params().clone(),
            fit: result.fit().map(|fit| FitSection {
                mode: fit.mode(),
                model: fit.model_name().to_string(),
                stats: fit.stats().cloned(),
            }),
        }
    }
}

/// Write a result JSON file.
pub fn write_result_json(path: &Path, analysis: &str, result: &AnalysisResult) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create result JSON '{}': {e}", path.display()))
    })?;
    serde_json::to_writer_pretty(file, &ResultFile::new(analysis, result))
        .map_err(|e| AppError::new(2, format!("Failed to write result JSON: {e}")))?;
    Ok(())
}

/// Write a one-dimensional dataset as `x,y` CSV.
pub fn write_dataset_csv(path: &Path, dataset: &Dataset) -> Result<(), AppError> {
    let x = dataset
        .coordinates()
        .as_1d()
        .ok_or_else(|| AppError::new(2, "Only one-dimensional datasets can be written as CSV."))?;
    write_xy_csv(path, x, dataset.data())
}

/// Sample the result's model on `n` evenly spaced points spanning the
/// dataset's coordinates and write them as `x,y` CSV.
pub fn write_curve_csv(
    path: &Path,
    result: &AnalysisResult,
    dataset: &Dataset,
    n: usize,
) -> Result<(), AppError> {
    if !result.can_eval() {
        return Err(AppError::new(
            2,
            "This analysis has no model to evaluate; --export-curve needs a fit.",
        ));
    }
    let x = dataset
        .coordinates()
        .as_1d()
        .ok_or_else(|| AppError::new(2, "Curve export needs one-dimensional coordinates."))?;
    let grid = build_grid(x, n);
    let y = result.eval(&Coordinates::from(grid.clone()))?;
    write_xy_csv(path, &grid, &y)
}

fn build_grid(x: &[f64], n: usize) -> Vec<f64> {
    let n = n.max(2);
    let (lo, hi) = x
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if !(lo.is_finite() && hi.is_finite()) || hi <= lo {
        return x.to_vec();
    }
    crate::data::linspace(lo, hi, n)
}

fn write_xy_csv(path: &Path, x: &[f64], y: &[f64]) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create CSV '{}': {e}", path.display())))?;

    writeln!(file, "x,y").map_err(|e| AppError::new(2, format!("Failed to write CSV header: {e}")))?;
    for (xi, yi) in x.iter().zip(y.iter()) {
        writeln!(file, "{xi},{yi}")
            .map_err(|e| AppError::new(2, format!("Failed to write CSV row: {e}")))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Analysis, FindMax};
    use crate::fit::Fit;
    use crate::io::load_dataset;
    use crate::models::LinearModel;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("anafit-{}-{name}", std::process::id()))
    }

    #[test]
    fn dataset_csv_round_trips_through_ingest() {
        let ds = Dataset::new(vec![0.0, 0.5, 1.0], vec![2.0, -1.25, 3.5]).unwrap();
        let path = temp_path("dataset.csv");
        write_dataset_csv(&path, &ds).unwrap();

        let back = load_dataset(&path, "x", "y").unwrap();
        assert_eq!(back.dataset, ds);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn result_json_keeps_params_and_stats() {
        let ds = Dataset::new(vec![0.0, 1.0, 2.0, 3.0], vec![1.0, 3.1, 4.9, 7.0]).unwrap();
        let result = Fit::of(LinearModel).run(&ds).unwrap();
        let path = temp_path("result.json");
        write_result_json(&path, "LinearFit", &result).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["tool"], "anafit");
        assert_eq!(raw["fit"]["mode"], "optimize");
        assert!(raw["fit"]["stats"]["chisqr"].is_number());
        assert_eq!(raw["params"][0]["name"], "a");

        assert_eq!(raw["analysis"], "LinearFit");
        assert_eq!(raw["params"][1]["name"], "b");
        let a = raw["params"][0]["value"].as_f64().unwrap();
        assert!((a - result.params().value("a").unwrap()).abs() < 1e-9);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn curve_export_requires_a_model() {
        let ds = Dataset::new(vec![0.0, 1.0], vec![1.0, 2.0]).unwrap();
        let result = FindMax.run(&ds).unwrap();
        let err = write_curve_csv(&temp_path("nocurve.csv"), &result, &ds, 10).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn curve_export_samples_grid() {
        let ds = Dataset::new(vec![0.0, 1.0, 2.0], vec![0.0, 2.0, 4.0]).unwrap();
        let result = Fit::of(LinearModel).dry().run(&ds).unwrap();
        let path = temp_path("curve.csv");
        write_curve_csv(&path, &result, &ds, 5).unwrap();

        let back = load_dataset(&path, "x", "y").unwrap();
        assert_eq!(back.rows_used, 5);
        assert!((back.dataset.data()[4] - 4.0).abs() < 1e-9);
        let _ = std::fs::remove_file(path);
    }
}

//! The `anafit run` workflow: CSV ingest -> analysis -> result.
//!
//! Kept apart from [`crate::app`] so it can be exercised without printing or
//! touching the process environment.

use crate::analysis::build_analysis;
use crate::domain::{AnalysisResult, RunConfig};
use crate::error::AppError;
use crate::io::{IngestedData, load_dataset};

/// All computed outputs of a single `anafit run`.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedData,
    pub analysis_name: String,
    pub result: AnalysisResult,
}

/// Load the input and run the configured analysis on it.
pub fn run_analysis(config: &RunConfig) -> Result<RunOutput, AppError> {
    let ingest = load_dataset(&config.input, &config.x_column, &config.y_column)?;
    log::info!(
        "loaded {} rows from {} ({} skipped)",
        ingest.rows_used,
        config.input.display(),
        ingest.row_errors.len()
    );

    let analysis = build_analysis(config.analysis, config.fit.clone());
    let result = analysis.run(&ingest.dataset)?;

    Ok(RunOutput {
        analysis_name: analysis.name().to_string(),
        ingest,
        result,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AnalysisKind, FitConfig};
    use std::path::PathBuf;

    fn write_csv(name: &str, body: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("anafit-{}-{name}", std::process::id()));
        std::fs::write(&path, body).unwrap();
        path
    }

    fn config(input: PathBuf, analysis: AnalysisKind) -> RunConfig {
        RunConfig {
            input,
            x_column: "t".to_string(),
            y_column: "signal".to_string(),
            analysis,
            fit: FitConfig::default(),
            export_json: None,
            export_curve: None,
            curve_points: 50,
        }
    }

    #[test]
    fn runs_find_max_on_csv() {
        let path = write_csv("max.csv", "t,signal\n0,1\n1,5\n2,bad\n3,2\n");
        let out = run_analysis(&config(path.clone(), AnalysisKind::Max)).unwrap();

        assert_eq!(out.analysis_name, "FindMax");
        assert_eq!(out.ingest.row_errors.len(), 1);
        assert_eq!(out.result.params().value("max_val").unwrap(), 5.0);
        assert_eq!(out.result.params().value("max_pos").unwrap(), 1.0);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn runs_linear_fit_on_csv() {
        let path = write_csv("linear.csv", "t,signal\n0,1\n1,3\n2,5\n3,7\n");
        let out = run_analysis(&config(path.clone(), AnalysisKind::Linear)).unwrap();

        assert_eq!(out.analysis_name, "LinearFit");
        assert!((out.result.params().value("a").unwrap() - 2.0).abs() < 1e-6);
        assert!(out.result.fit().unwrap().success());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn missing_file_is_usage_error() {
        let cfg = config(PathBuf::from("/definitely/not/here.csv"), AnalysisKind::Max);
        assert_eq!(run_analysis(&cfg).unwrap_err().exit_code(), 2);
    }
}

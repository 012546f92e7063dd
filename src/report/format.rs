//! Formatted terminal output.
//!
//! All text the binary prints lives here so the analysis code stays free of
//! presentation concerns.

use clap::ValueEnum;

use crate::domain::{AnalysisKind, AnalysisResult, FitMode, ParamValue, Parameter};
use crate::fit::attr_or_none;
use crate::io::IngestedData;
use crate::math::min_max;
use crate::models::build_model;
use crate::report::{compute_residuals, summarize_residuals};

/// Format the full run summary: input overview, fit statistics, parameters.
pub fn format_run_summary(analysis: &str, ingest: &IngestedData, result: &AnalysisResult) -> String {
    let mut out = String::new();
    let dataset = &ingest.dataset;

    out.push_str(&format!("=== anafit - {analysis} ===\n"));
    out.push_str(&format!(
        "Rows: used={} read={} skipped={}\n",
        ingest.rows_used,
        ingest.rows_read,
        ingest.row_errors.len()
    ));
    if let Some(x) = dataset.coordinates().as_1d() {
        if let (Some((x_lo, x_hi)), Some((y_lo, y_hi))) = (min_max(x), min_max(dataset.data())) {
            out.push_str(&format!(
                "Range: x=[{}, {}] | y=[{}, {}]\n",
                fmt_num(x_lo),
                fmt_num(x_hi),
                fmt_num(y_lo),
                fmt_num(y_hi)
            ));
        }
    }

    if let Some(fit) = result.fit() {
        out.push_str(&format!("Mode: {}\n", mode_label(fit.mode())));
        if let Some(stats) = fit.stats() {
            out.push_str("\nFit statistics:\n");
            out.push_str(&format!("  success    {} ({})\n", stats.success, stats.message));
            out.push_str(&format!("  nfev       {}\n", stats.nfev));
            out.push_str(&format!("  ndata      {}\n", stats.ndata));
            out.push_str(&format!("  nvarys     {}\n", stats.nvarys));
            out.push_str(&format!("  chisqr     {}\n", fmt_num(stats.chisqr)));
            out.push_str(&format!("  redchi     {}\n", fmt_num(stats.redchi)));
            out.push_str(&format!("  aic        {}\n", fmt_num(stats.aic)));
            out.push_str(&format!("  bic        {}\n", fmt_num(stats.bic)));
            out.push_str(&format!("  rsquared   {}\n", fmt_num(stats.rsquared)));
        }
        match compute_residuals(result, dataset) {
            Ok(residuals) => {
                if let Some(s) = summarize_residuals(&residuals) {
                    out.push_str(&format!(
                        "  residuals  rms={} max|r|={} (row {})\n",
                        fmt_num(s.rms),
                        fmt_num(s.max_abs),
                        s.worst
                    ));
                }
            }
            Err(err) => out.push_str(&format!("  residuals  unavailable: {err}\n")),
        }
        out.push_str("\nParameters:\n");
        out.push_str(&format_fit_params(result));
    } else {
        out.push_str("\nResults:\n");
        for p in result.params() {
            out.push_str(&format!("  {:<10} {}{}\n", p.name(), fmt_value(p.value()), fmt_attrs(p)));
        }
    }

    out
}

/// Parameter table of a fit: value, standard error, initial value, constraints.
pub fn format_fit_params(result: &AnalysisResult) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "  {:<8} {:>14} {:>14} {:>9} {:>14}  {}\n",
            "name", "value", "stderr", "rel", "init", "constraint"
        )
        .trim_end(),
    );
    out.push('\n');

    for p in result.params() {
        let value = p.value().as_f64().unwrap_or(f64::NAN);
        let stderr = p.stderr();
        let rel = stderr
            .filter(|_| value != 0.0)
            .map(|e| format!("{:.2}%", 100.0 * e / value.abs()))
            .unwrap_or_default();
        let line = format!(
            "  {:<8} {:>14} {:>14} {:>9} {:>14}  {}",
            p.name(),
            fmt_num(value),
            stderr.map(fmt_num).unwrap_or_else(|| "-".to_string()),
            rel,
            attr_or_none(p, "init_value").map(fmt_num).unwrap_or_default(),
            constraint_label(p),
        );
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Skipped-row listing, capped at `limit` entries.
pub fn format_row_errors(ingest: &IngestedData, limit: usize) -> String {
    let mut out = String::new();
    for err in ingest.row_errors.iter().take(limit) {
        out.push_str(&format!("  line {}: {}\n", err.line, err.message));
    }
    if ingest.row_errors.len() > limit {
        out.push_str(&format!("  ... and {} more\n", ingest.row_errors.len() - limit));
    }
    out
}

/// Table of every analysis the CLI can run.
pub fn format_analysis_list() -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<10} {:<20} {}\n", "name", "analysis", "outputs"));
    out.push_str(&format!("{:-<10} {:-<20} {:-<20}\n", "", "", ""));
    for kind in AnalysisKind::ALL {
        let cli_name = kind
            .to_possible_value()
            .map(|v| v.get_name().to_string())
            .unwrap_or_default();
        let outputs = match kind.to_model() {
            Some(model) => build_model(model).param_names().join(", "),
            None if kind == AnalysisKind::Min => "min_val, min_pos".to_string(),
            None => "max_val, max_pos".to_string(),
        };
        out.push_str(&format!("{:<10} {:<20} {}\n", cli_name, kind.display_name(), outputs));
    }
    out
}

fn mode_label(mode: FitMode) -> &'static str {
    match mode {
        FitMode::Optimize => "optimize",
        FitMode::Dry => "dry (initial guess only)",
    }
}

fn constraint_label(p: &Parameter) -> String {
    if p.attr("vary").ok().and_then(ParamValue::as_bool) == Some(false) {
        return "fixed".to_string();
    }
    match (attr_or_none(p, "min"), attr_or_none(p, "max")) {
        (None, None) => String::new(),
        (lo, hi) => format!(
            "[{}, {}]",
            lo.map(fmt_num).unwrap_or_else(|| "-inf".to_string()),
            hi.map(fmt_num).unwrap_or_else(|| "inf".to_string())
        ),
    }
}

fn fmt_attrs(p: &Parameter) -> String {
    let parts: Vec<String> = p
        .attributes()
        .map(|(k, v)| format!("{k}={}", fmt_value(v)))
        .collect();
    if parts.is_empty() {
        String::new()
    } else {
        format!("  ({})", parts.join(", "))
    }
}

fn fmt_value(v: &ParamValue) -> String {
    match v {
        ParamValue::Number(x) => fmt_num(*x),
        ParamValue::Array(xs) => {
            let parts: Vec<String> = xs.iter().map(|x| fmt_num(*x)).collect();
            format!("[{}]", parts.join(", "))
        }
        other => other.to_string(),
    }
}

fn fmt_num(v: f64) -> String {
    let a = v.abs();
    if v == 0.0 || !v.is_finite() || (1e-3..1e6).contains(&a) {
        format!("{v:.6}")
    } else {
        format!("{v:.6e}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Analysis, FindMax};
    use crate::domain::{Dataset, ParamHint};
    use crate::fit::Fit;
    use crate::io::RowError;
    use crate::models::LinearModel;

    fn ingest(dataset: Dataset) -> IngestedData {
        let n = dataset.len();
        IngestedData {
            dataset,
            row_errors: vec![RowError {
                line: 3,
                message: "y: invalid number 'x'".to_string(),
            }],
            rows_read: n + 1,
            rows_used: n,
        }
    }

    #[test]
    fn fit_summary_lists_statistics_and_params() {
        let ds = Dataset::new(vec![0.0, 1.0, 2.0, 3.0], vec![1.0, 2.9, 5.1, 7.0]).unwrap();
        let result = Fit::of(LinearModel)
            .with_override("b", ParamHint::fixed(1.0))
            .run(&ds)
            .unwrap();
        let text = format_run_summary("LinearFit", &ingest(ds), &result);

        assert!(text.contains("=== anafit - LinearFit ==="));
        assert!(text.contains("skipped=1"));
        assert!(text.contains("chisqr"));
        assert!(text.contains("Mode: optimize"));
        let b_line = text.lines().find(|l| l.trim_start().starts_with("b ")).unwrap();
        assert!(b_line.ends_with("fixed"), "{b_line}");
        assert!(text.contains("residuals  rms="));
    }

    #[test]
    fn non_finite_prediction_is_reported_not_hidden() {
        let ds = Dataset::new(vec![0.0, 1.0, 2.0], vec![1.0, 2.0, 3.0]).unwrap();
        let result = Fit::of(LinearModel)
            .with_override("a", ParamHint::value(f64::MAX))
            .with_override("b", ParamHint::value(f64::MAX))
            .dry()
            .run(&ds)
            .unwrap();
        let text = format_run_summary("LinearFit", &ingest(ds), &result);
        assert!(text.contains("residuals  unavailable"), "{text}");
    }

    #[test]
    fn extremum_summary_shows_attributes() {
        let ds = Dataset::new(vec![0.0, 1.0, 2.0], vec![1.0, 4.0, 2.0]).unwrap();
        let result = FindMax.run(&ds).unwrap();
        let text = format_run_summary("FindMax", &ingest(ds), &result);

        assert!(text.contains("max_val"));
        assert!(text.contains("max_pos"));
        assert!(text.contains("index=1.000000"));
        assert!(!text.contains("Fit statistics"));
    }

    #[test]
    fn analysis_list_names_every_kind() {
        let text = format_analysis_list();
        for name in ["max", "min", "cosine", "linear", "exp-decay", "gaussian"] {
            assert!(text.lines().any(|l| l.starts_with(name)), "missing {name}");
        }
        assert!(text.contains("A, f, phi, offset"));
    }

    #[test]
    fn row_errors_are_capped() {
        let ds = Dataset::new(vec![0.0], vec![1.0]).unwrap();
        let mut data = ingest(ds);
        data.row_errors.push(RowError {
            line: 9,
            message: "missing value".to_string(),
        });
        let text = format_row_errors(&data, 1);
        assert!(text.contains("line 3"));
        assert!(text.contains("and 1 more"));
    }

    #[test]
    fn numbers_switch_to_scientific_outside_plain_range() {
        assert_eq!(fmt_num(1.5), "1.500000");
        assert_eq!(fmt_num(0.0), "0.000000");
        assert_eq!(fmt_num(2.5e-7), "2.500000e-7");
    }
}

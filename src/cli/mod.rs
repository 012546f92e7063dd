//! Command-line parsing for `anafit`.
//!
//! Argument parsing and validation of `NAME=VALUE` pairs live here; turning
//! the parsed arguments into run configurations happens in [`crate::app`].

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{AnalysisKind, ModelKind};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "anafit", version, about = "Run analyses and curve fits on 1-D measurement data")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run an analysis on a CSV file and print the result.
    Run(RunArgs),
    /// Write a synthetic dataset (model + Gaussian noise) to CSV.
    Synth(SynthArgs),
    /// List the available analyses and their outputs.
    List,
}

#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    /// Input CSV with a header row.
    #[arg(short, long, value_name = "CSV")]
    pub input: PathBuf,

    /// Analysis to run.
    #[arg(short, long, value_enum)]
    pub analysis: AnalysisKind,

    /// Coordinate column.
    #[arg(long, default_value = "x")]
    pub x: String,

    /// Data column.
    #[arg(long, default_value = "y")]
    pub y: String,

    /// Report the initial guess without optimizing (fits only).
    #[arg(long)]
    pub dry: bool,

    /// Starting value for a fit parameter (repeatable).
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    pub set: Vec<(String, f64)>,

    /// Hold a fit parameter fixed at its starting value (repeatable).
    #[arg(long = "fix", value_name = "NAME")]
    pub fix: Vec<String>,

    /// Lower bound for a fit parameter (repeatable).
    #[arg(long = "min", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    pub min: Vec<(String, f64)>,

    /// Upper bound for a fit parameter (repeatable).
    #[arg(long = "max", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    pub max: Vec<(String, f64)>,

    /// Optimizer evaluation budget (default: 200 * (free params + 1)).
    #[arg(long)]
    pub max_nfev: Option<usize>,

    /// Print skipped input rows (at most this many).
    #[arg(long, default_value_t = 10)]
    pub show_skipped: usize,

    /// Export the result to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Export the evaluated model curve to CSV (fits only).
    #[arg(long = "export-curve", value_name = "CSV")]
    pub export_curve: Option<PathBuf>,

    /// Points in the exported curve.
    #[arg(long, default_value_t = 200)]
    pub curve_points: usize,
}

#[derive(Debug, Parser, Clone)]
pub struct SynthArgs {
    /// Model shape to sample.
    #[arg(short, long, value_enum)]
    pub shape: ModelKind,

    /// Output CSV path.
    #[arg(short, long, value_name = "CSV")]
    pub output: PathBuf,

    /// Number of points.
    #[arg(short = 'n', long, default_value_t = 200)]
    pub n: usize,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub x_min: f64,

    #[arg(long, default_value_t = 10.0, allow_negative_numbers = true)]
    pub x_max: f64,

    /// Standard deviation of the additive Gaussian noise.
    #[arg(long, default_value_t = 0.05)]
    pub noise: f64,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Model parameter value (repeatable); unset parameters use the shape's defaults.
    #[arg(short = 'p', long = "param", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    pub params: Vec<(String, f64)>,
}

/// Parse `NAME=VALUE` with a finite numeric value.
pub fn parse_assignment(raw: &str) -> Result<(String, f64), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing parameter name in '{raw}'"));
    }
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid number '{}' for '{name}'", value.trim()))?;
    if !value.is_finite() {
        return Err(format!("value for '{name}' must be finite"));
    }
    Ok((name.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_assignment_accepts_name_value() {
        assert_eq!(parse_assignment("f=1.5").unwrap(), ("f".to_string(), 1.5));
        assert_eq!(parse_assignment(" phi = -0.25 ").unwrap(), ("phi".to_string(), -0.25));
    }

    #[test]
    fn parse_assignment_rejects_bad_input() {
        assert!(parse_assignment("f").is_err());
        assert!(parse_assignment("=1").is_err());
        assert!(parse_assignment("f=abc").is_err());
        assert!(parse_assignment("f=inf").is_err());
    }

    #[test]
    fn run_args_collect_overrides() {
        let cli = Cli::try_parse_from([
            "anafit", "run", "-i", "data.csv", "-a", "cosine", "--set", "f=1.3", "--set", "A=2",
            "--fix", "offset", "--min", "A=0", "--max-nfev", "500",
        ])
        .unwrap();
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.analysis, AnalysisKind::Cosine);
        assert_eq!(args.set, vec![("f".to_string(), 1.3), ("A".to_string(), 2.0)]);
        assert_eq!(args.fix, vec!["offset".to_string()]);
        assert_eq!(args.min, vec![("A".to_string(), 0.0)]);
        assert_eq!(args.max_nfev, Some(500));
        assert_eq!(args.x, "x");
        assert!(!args.dry);
    }

    #[test]
    fn synth_args_parse_shape_and_params() {
        let cli = Cli::try_parse_from([
            "anafit", "synth", "-s", "exp-decay", "-o", "out.csv", "-p", "tau=2", "--x-min", "-1",
        ])
        .unwrap();
        let Command::Synth(args) = cli.command else {
            panic!("expected synth");
        };
        assert_eq!(args.shape, ModelKind::ExpDecay);
        assert_eq!(args.params, vec![("tau".to_string(), 2.0)]);
        assert_eq!(args.x_min, -1.0);
        assert_eq!(args.n, 200);
    }

    #[test]
    fn unknown_analysis_is_rejected() {
        assert!(Cli::try_parse_from(["anafit", "run", "-i", "d.csv", "-a", "spline"]).is_err());
    }
}

//! Top-level application orchestration.
//!
//! `src/main.rs` only sets up logging and maps errors to exit codes; this
//! module parses arguments, runs the selected command, prints reports and
//! writes optional exports.

use clap::Parser;

use crate::cli::{Cli, Command, RunArgs, SynthArgs};
use crate::domain::{FitConfig, FitMode, RunConfig, SynthConfig};
use crate::error::AppError;
use crate::math::LmOptions;

pub mod pipeline;

/// Entry point for the `anafit` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => handle_run(&args),
        Command::Synth(args) => handle_synth(&args),
        Command::List => {
            print!("{}", crate::report::format_analysis_list());
            Ok(())
        }
    }
}

fn handle_run(args: &RunArgs) -> Result<(), AppError> {
    let config = run_config_from_args(args)?;
    let run = pipeline::run_analysis(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(&run.analysis_name, &run.ingest, &run.result)
    );
    if !run.ingest.row_errors.is_empty() && args.show_skipped > 0 {
        println!("Skipped rows:");
        print!("{}", crate::report::format_row_errors(&run.ingest, args.show_skipped));
    }

    if let Some(path) = &config.export_json {
        crate::io::write_result_json(path, &run.analysis_name, &run.result)?;
        log::info!("wrote result JSON to {}", path.display());
    }
    if let Some(path) = &config.export_curve {
        crate::io::write_curve_csv(path, &run.result, &run.ingest.dataset, config.curve_points)?;
        log::info!("wrote curve CSV to {}", path.display());
    }

    Ok(())
}

fn handle_synth(args: &SynthArgs) -> Result<(), AppError> {
    let config = synth_config_from_args(args);
    let dataset = crate::data::generate(&config)?;
    crate::io::write_dataset_csv(&config.output, &dataset)?;
    println!(
        "Wrote {} {} points to {}",
        dataset.len(),
        config.shape.display_name(),
        config.output.display()
    );
    Ok(())
}

/// Build a [`RunConfig`] from `anafit run` flags.
///
/// Parameter flags are merged per name, in the order `--set`, `--fix`,
/// `--min`, `--max`. They are rejected for analyses that are not fits.
pub fn run_config_from_args(args: &RunArgs) -> Result<RunConfig, AppError> {
    let is_fit = args.analysis.to_model().is_some();
    let has_fit_flags = args.dry
        || !args.set.is_empty()
        || !args.fix.is_empty()
        || !args.min.is_empty()
        || !args.max.is_empty()
        || args.max_nfev.is_some()
        || args.export_curve.is_some();
    if !is_fit && has_fit_flags {
        return Err(AppError::new(
            2,
            format!(
                "{} is not a fit; --dry, --set, --fix, --min, --max, --max-nfev and --export-curve do not apply.",
                args.analysis.display_name()
            ),
        ));
    }
    if args.curve_points < 2 {
        return Err(AppError::new(2, "--curve-points must be >= 2."));
    }

    let mut fit = FitConfig {
        mode: if args.dry { FitMode::Dry } else { FitMode::Optimize },
        overrides: Vec::new(),
        options: LmOptions {
            max_nfev: args.max_nfev,
            ..LmOptions::default()
        },
    };
    for (name, value) in &args.set {
        fit.override_mut(name).value = Some(*value);
    }
    for name in &args.fix {
        fit.override_mut(name).vary = false;
    }
    for (name, value) in &args.min {
        fit.override_mut(name).min = Some(*value);
    }
    for (name, value) in &args.max {
        fit.override_mut(name).max = Some(*value);
    }

    Ok(RunConfig {
        input: args.input.clone(),
        x_column: args.x.clone(),
        y_column: args.y.clone(),
        analysis: args.analysis,
        fit,
        export_json: args.export_json.clone(),
        export_curve: args.export_curve.clone(),
        curve_points: args.curve_points,
    })
}

pub fn synth_config_from_args(args: &SynthArgs) -> SynthConfig {
    SynthConfig {
        shape: args.shape,
        n: args.n,
        x_min: args.x_min,
        x_max: args.x_max,
        noise: args.noise,
        seed: args.seed,
        params: args.params.clone(),
        output: args.output.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ParamHint;

    fn parse_run(extra: &[&str]) -> RunArgs {
        let mut argv = vec!["anafit", "run", "-i", "in.csv"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Run(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn parameter_flags_merge_per_name() {
        let args = parse_run(&[
            "-a", "gaussian", "--set", "sigma=0.5", "--min", "sigma=0.1", "--fix", "offset",
            "--set", "offset=0",
        ]);
        let config = run_config_from_args(&args).unwrap();

        assert_eq!(config.fit.mode, FitMode::Optimize);
        assert_eq!(
            config.fit.overrides,
            vec![
                ("sigma".to_string(), ParamHint::value(0.5).with_bounds(Some(0.1), None)),
                ("offset".to_string(), ParamHint::fixed(0.0)),
            ]
        );
    }

    #[test]
    fn dry_and_budget_flow_into_fit_config() {
        let args = parse_run(&["-a", "cosine", "--dry", "--max-nfev", "42"]);
        let config = run_config_from_args(&args).unwrap();
        assert_eq!(config.fit.mode, FitMode::Dry);
        assert_eq!(config.fit.options.max_nfev, Some(42));
    }

    #[test]
    fn fit_flags_are_rejected_for_extrema() {
        let args = parse_run(&["-a", "max", "--set", "A=1"]);
        let err = run_config_from_args(&args).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let args = parse_run(&["-a", "min", "--export-json", "out.json"]);
        assert!(run_config_from_args(&args).is_ok());
    }

    #[test]
    fn end_to_end_synth_then_run() {
        let dir = std::env::temp_dir();
        let csv = dir.join(format!("anafit-{}-e2e.csv", std::process::id()));
        let synth = SynthConfig {
            shape: crate::domain::ModelKind::Linear,
            n: 50,
            x_min: 0.0,
            x_max: 5.0,
            noise: 0.01,
            seed: 7,
            params: vec![("a".to_string(), 3.0), ("b".to_string(), -1.0)],
            output: csv.clone(),
        };
        let dataset = crate::data::generate(&synth).unwrap();
        crate::io::write_dataset_csv(&csv, &dataset).unwrap();

        let args = parse_run(&["-a", "linear"]);
        let mut config = run_config_from_args(&args).unwrap();
        config.input = csv.clone();
        let out = pipeline::run_analysis(&config).unwrap();

        assert!((out.result.params().value("a").unwrap() - 3.0).abs() < 0.02);
        assert!((out.result.params().value("b").unwrap() + 1.0).abs() < 0.05);
        let _ = std::fs::remove_file(csv);
    }
}

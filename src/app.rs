//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - sets up logging
//! - runs the fit pipeline
//! - prints the summary and optional terminal plot
//! - writes params, plots, and exports

use clap::Parser;
use tracing::info;

use crate::cli::{Command, FitArgs, PlotArgs, SynthArgs};
use crate::data::synth::{SynthOptions, generate, write_points_csv};
use crate::domain::{Bounds, CurveParams, FitConfig, ParamRange};
use crate::error::AppError;
use crate::io::{load_points, read_params_json};
use crate::plot::render_ascii_plot;
use crate::report::{compute_residuals, format_run_summary};

pub mod pipeline;

/// Entry point for the `xyfit` binary.
pub fn run() -> Result<(), AppError> {
    // `xyfit` and `xyfit --data foo.csv` behave like `xyfit fit ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Synth(args) => handle_synth(args),
        Command::Plot(args) => handle_plot(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    crate::logging::init(Some(&args.output_dir), args.verbose);
    let config = fit_config_from_args(&args)?;

    let run = pipeline::run_fit(&config)?;
    let outputs = pipeline::write_artifacts(&config, &run)?;

    println!(
        "{}",
        format_run_summary(&config, &run.outcome, run.summary.as_ref())
    );

    if config.ascii_plot {
        let plot = render_ascii_plot(
            &run.points,
            Some(&run.outcome.result),
            config.curve_points,
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    println!("Outputs:");
    for path in outputs {
        println!("- {}", path.display());
    }
    Ok(())
}

fn handle_synth(args: SynthArgs) -> Result<(), AppError> {
    crate::logging::init(None, args.verbose);
    let options = SynthOptions {
        params: CurveParams::new(args.theta, args.m, args.x),
        n_points: args.n_points,
        noise: args.noise,
        seed: args.seed,
        shuffle: args.shuffle,
    };
    let points = generate(&options)?;
    write_points_csv(&args.output, &points)?;
    info!(
        theta_deg = args.theta,
        m = args.m,
        x = args.x,
        noise = args.noise,
        "Wrote {} synthetic points to {}",
        points.len(),
        args.output.display()
    );
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    crate::logging::init(None, args.verbose);
    let result = read_params_json(&args.params)?;
    let points = load_points(&args.data)?;
    let residuals = compute_residuals(&points, &result, args.n_samples, args.residuals)?;

    let outputs = pipeline::render_plots(
        &args.output_dir,
        &points,
        &result,
        &residuals,
        args.residuals,
        args.curve_points,
    )?;

    if args.ascii.ascii {
        println!(
            "{}",
            render_ascii_plot(&points, Some(&result), args.curve_points, args.ascii.width, args.ascii.height)
        );
    }
    for path in outputs {
        println!("- {}", path.display());
    }
    Ok(())
}

/// Map `fit` flags onto a pipeline configuration.
///
/// Unset bound and guess flags fall back to `Bounds::default()` and
/// `CurveParams::default()`.
pub fn fit_config_from_args(args: &FitArgs) -> Result<FitConfig, AppError> {
    if args.n_samples == 0 {
        return Err(AppError::new(2, "--n-samples must be >= 1."));
    }

    let defaults = Bounds::default();
    let range = |min: Option<f64>, max: Option<f64>, default: ParamRange| {
        ParamRange::new(min.unwrap_or(default.min), max.unwrap_or(default.max))
    };
    let bounds = Bounds {
        theta_deg: range(args.theta_min, args.theta_max, defaults.theta_deg),
        m: range(args.m_min, args.m_max, defaults.m),
        x: range(args.x_min, args.x_max, defaults.x),
    };
    bounds.check()?;

    let guess = CurveParams::default();
    let initial_guess = CurveParams::new(
        args.guess_theta.unwrap_or(guess.theta_deg),
        args.guess_m.unwrap_or(guess.m),
        args.guess_x.unwrap_or(guess.x),
    );

    Ok(FitConfig {
        data_path: args.data.clone(),
        output_dir: args.output_dir.clone(),
        n_samples: args.n_samples,
        n_restarts: args.n_restarts,
        seed: args.seed,
        bounds,
        initial_guess,
        curve_points: args.curve_points,
        residual_mode: args.residuals,
        plots: !args.no_plots,
        export_residuals: args.export_residuals,
        ascii_plot: args.ascii.ascii,
        plot_width: args.ascii.width,
        plot_height: args.ascii.height,
    })
}

/// Rewrite argv so `xyfit` defaults to `xyfit fit`.
///
/// Rules:
/// - `xyfit`                      -> `xyfit fit`
/// - `xyfit --data d.csv ...`     -> `xyfit fit --data d.csv ...`
/// - `xyfit --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("fit".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "fit" | "synth" | "plot");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "fit flags".
    if arg1.starts_with('-') {
        argv.insert(1, "fit".to_string());
        return argv;
    }

    argv
}

//! Command-line parsing for the parametric curve fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fitting/math code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::ResidualMode;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "xyfit", version, about = "Fit a rotated, oscillating parametric curve to (x, y) points")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit the curve to a CSV of points; write params, plots, and a run manifest.
    Fit(FitArgs),
    /// Write a synthetic point set drawn from known parameters.
    Synth(SynthArgs),
    /// Re-render plots from an existing params JSON and data CSV.
    Plot(PlotArgs),
}

/// Terminal preview options shared by `fit` and `plot`.
#[derive(Debug, Args, Clone)]
pub struct AsciiArgs {
    /// Print an ASCII preview of the data and fitted curve.
    #[arg(long)]
    pub ascii: bool,

    /// ASCII plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// ASCII plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Input CSV with `x` and `y` columns.
    #[arg(long, default_value = "data/xy_data.csv")]
    pub data: PathBuf,

    /// Number of curve samples used by the loss.
    #[arg(long, default_value_t = 200)]
    pub n_samples: usize,

    /// Directory for params, plots, manifest, and log.
    #[arg(long, default_value = "results")]
    pub output_dir: PathBuf,

    /// Seed for restart starts and the global search.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of local restarts (the first starts from the initial guess).
    #[arg(long, default_value_t = 10)]
    pub n_restarts: usize,

    /// Lower search bound for theta (degrees).
    #[arg(long)]
    pub theta_min: Option<f64>,
    /// Upper search bound for theta (degrees).
    #[arg(long)]
    pub theta_max: Option<f64>,
    /// Lower search bound for M.
    #[arg(long, allow_hyphen_values = true)]
    pub m_min: Option<f64>,
    /// Upper search bound for M.
    #[arg(long, allow_hyphen_values = true)]
    pub m_max: Option<f64>,
    /// Lower search bound for X.
    #[arg(long)]
    pub x_min: Option<f64>,
    /// Upper search bound for X.
    #[arg(long)]
    pub x_max: Option<f64>,

    /// Initial guess for theta (degrees).
    #[arg(long)]
    pub guess_theta: Option<f64>,
    /// Initial guess for M.
    #[arg(long, allow_hyphen_values = true)]
    pub guess_m: Option<f64>,
    /// Initial guess for X.
    #[arg(long)]
    pub guess_x: Option<f64>,

    /// Number of t samples used to draw the fitted curve.
    #[arg(long, default_value_t = 500)]
    pub curve_points: usize,

    /// How residuals pair observations with the curve.
    #[arg(long, value_enum, default_value_t = ResidualMode::Nearest)]
    pub residuals: ResidualMode,

    /// Skip PNG rendering.
    #[arg(long)]
    pub no_plots: bool,

    /// Also write per-point residuals to `residuals.csv`.
    #[arg(long)]
    pub export_residuals: bool,

    #[command(flatten)]
    pub ascii: AsciiArgs,

    /// Log at debug level (overridden by `RUST_LOG`).
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct SynthArgs {
    /// True theta (degrees).
    #[arg(long, default_value_t = 25.0)]
    pub theta: f64,

    /// True M.
    #[arg(long, default_value_t = 0.01, allow_hyphen_values = true)]
    pub m: f64,

    /// True X.
    #[arg(long, default_value_t = 50.0)]
    pub x: f64,

    /// Number of points, evenly spaced in t.
    #[arg(long, default_value_t = 100)]
    pub n_points: usize,

    /// Gaussian noise standard deviation on x and y.
    #[arg(long, default_value_t = 0.1)]
    pub noise: f64,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Shuffle the rows.
    #[arg(long)]
    pub shuffle: bool,

    /// Output CSV path.
    #[arg(long, default_value = "data/xy_data.csv")]
    pub output: PathBuf,

    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Parser, Clone)]
pub struct PlotArgs {
    /// Params JSON written by `xyfit fit`.
    #[arg(long, value_name = "JSON", default_value = "results/params.json")]
    pub params: PathBuf,

    /// Input CSV with `x` and `y` columns.
    #[arg(long, default_value = "data/xy_data.csv")]
    pub data: PathBuf,

    /// Directory for the rendered plots.
    #[arg(long, default_value = "results")]
    pub output_dir: PathBuf,

    /// Curve samples used for residuals.
    #[arg(long, default_value_t = 200)]
    pub n_samples: usize,

    #[arg(long, default_value_t = 500)]
    pub curve_points: usize,

    #[arg(long, value_enum, default_value_t = ResidualMode::Nearest)]
    pub residuals: ResidualMode,

    #[command(flatten)]
    pub ascii: AsciiArgs,

    #[arg(short, long)]
    pub verbose: bool,
}

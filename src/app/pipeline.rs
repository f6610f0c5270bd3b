//! Shared "fit pipeline" logic used by the `fit` and `plot` commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load CSV -> fit -> residuals -> params/plots/exports -> manifest
//!
//! The command handlers can then focus on presentation.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::domain::{FitConfig, FitResult, ObservedPoint, Residual, ResidualMode};
use crate::error::AppError;
use crate::fit::{FitOptions, FitOutcome, fit_with_diagnostics};
use crate::io::{MANIFEST_FILE, RunManifest, load_points, write_manifest_json, write_params_json, write_residuals_csv};
use crate::plot::{render_fit_plot, render_residual_plot};
use crate::report::{ResidualSummary, compute_residuals, summarize};

pub const PARAMS_FILE: &str = "params.json";
pub const FIT_PLOT_FILE: &str = "fit_plot.png";
pub const RESIDUAL_PLOT_FILE: &str = "residuals_plot.png";
pub const RESIDUALS_CSV_FILE: &str = "residuals.csv";

/// All computed outputs of a single `xyfit fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub started_at: DateTime<Utc>,
    pub points: Vec<ObservedPoint>,
    pub outcome: FitOutcome,
    pub residuals: Vec<Residual>,
    pub summary: Option<ResidualSummary>,
}

/// Engine options for a pipeline configuration.
pub fn fit_options(config: &FitConfig) -> FitOptions {
    FitOptions {
        n_samples: config.n_samples,
        bounds: config.bounds,
        initial_guess: config.initial_guess,
        n_restarts: config.n_restarts,
        seed: config.seed,
        ..FitOptions::default()
    }
}

/// Load the data, fit, and compute residuals. Writes nothing.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    let started_at = Utc::now();

    let points = load_points(&config.data_path)?;
    info!("Loaded {} points from {}", points.len(), config.data_path.display());

    let outcome = fit_with_diagnostics(&points, &fit_options(config))?;

    let residuals = compute_residuals(&points, &outcome.result, config.n_samples, config.residual_mode)?;
    let summary = summarize(&residuals);

    Ok(RunOutput {
        started_at,
        points,
        outcome,
        residuals,
        summary,
    })
}

/// Write params, plots, optional residual CSV, and the manifest.
///
/// Returns every written path, manifest last.
pub fn write_artifacts(config: &FitConfig, run: &RunOutput) -> Result<Vec<PathBuf>, AppError> {
    let dir = &config.output_dir;
    let mut outputs = Vec::new();

    let params_path = dir.join(PARAMS_FILE);
    write_params_json(&params_path, &run.outcome.result)?;
    info!("Saved parameters to {}", params_path.display());
    outputs.push(params_path);

    if config.plots {
        outputs.extend(render_plots(
            dir,
            &run.points,
            &run.outcome.result,
            &run.residuals,
            config.residual_mode,
            config.curve_points,
        )?);
    }

    if config.export_residuals {
        let path = dir.join(RESIDUALS_CSV_FILE);
        write_residuals_csv(&path, &run.residuals)?;
        info!("Saved residuals to {}", path.display());
        outputs.push(path);
    }

    let manifest_path = dir.join(MANIFEST_FILE);
    let manifest = RunManifest::new(config, &run.outcome, run.started_at, outputs.clone());
    write_manifest_json(&manifest_path, &manifest)?;
    info!("Saved run manifest to {}", manifest_path.display());
    outputs.push(manifest_path);

    Ok(outputs)
}

/// Render the fit and residual PNGs into `dir`.
pub fn render_plots(
    dir: &Path,
    points: &[ObservedPoint],
    result: &FitResult,
    residuals: &[Residual],
    mode: ResidualMode,
    curve_points: usize,
) -> Result<Vec<PathBuf>, AppError> {
    let fit_path = dir.join(FIT_PLOT_FILE);
    render_fit_plot(&fit_path, points, result, curve_points)?;
    info!("Saved fit plot to {}", fit_path.display());

    let residual_path = dir.join(RESIDUAL_PLOT_FILE);
    render_residual_plot(&residual_path, residuals, mode)?;
    info!("Saved residual plot to {}", residual_path.display());

    Ok(vec![fit_path, residual_path])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synth::{SynthOptions, generate, write_points_csv};
    use crate::domain::{Bounds, CurveParams};
    use crate::io::read_params_json;

    fn config(dir: &Path, data: PathBuf) -> FitConfig {
        FitConfig {
            data_path: data,
            output_dir: dir.join("results"),
            n_samples: 20,
            n_restarts: 2,
            seed: 42,
            bounds: Bounds::default(),
            initial_guess: CurveParams::default(),
            curve_points: 100,
            residual_mode: ResidualMode::Nearest,
            plots: true,
            export_residuals: true,
            ascii_plot: false,
            plot_width: 60,
            plot_height: 20,
        }
    }

    #[test_log::test]
    fn end_to_end_writes_every_artifact() {
        let dir = std::env::temp_dir().join(format!("xyfit-pipeline-{}", std::process::id()));
        let data = dir.join("xy.csv");
        let points = generate(&SynthOptions {
            n_points: 60,
            shuffle: true,
            ..Default::default()
        })
        .unwrap();
        write_points_csv(&data, &points).unwrap();

        let config = config(&dir, data);
        let run = run_fit(&config).unwrap();
        assert_eq!(run.points.len(), 60);
        assert_eq!(run.residuals.len(), 60);
        assert!(run.summary.is_some());

        let outputs = write_artifacts(&config, &run).unwrap();
        let names: Vec<String> = outputs
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect();
        assert_eq!(
            names,
            vec![PARAMS_FILE, FIT_PLOT_FILE, RESIDUAL_PLOT_FILE, RESIDUALS_CSV_FILE, MANIFEST_FILE]
        );
        assert!(outputs.iter().all(|p| p.exists()));

        let reloaded = read_params_json(&config.output_dir.join(PARAMS_FILE)).unwrap();
        assert_eq!(reloaded, run.outcome.result);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_data_file_fails_before_fitting() {
        let dir = std::env::temp_dir().join(format!("xyfit-pipeline-missing-{}", std::process::id()));
        let config = config(&dir, dir.join("nope.csv"));
        let err = run_fit(&config).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn optional_outputs_are_skipped() {
        let dir = std::env::temp_dir().join(format!("xyfit-pipeline-minimal-{}", std::process::id()));
        let data = dir.join("xy.csv");
        write_points_csv(
            &data,
            &generate(&SynthOptions {
                n_points: 15,
                ..Default::default()
            })
            .unwrap(),
        )
        .unwrap();

        let mut config = config(&dir, data);
        config.plots = false;
        config.export_residuals = false;
        config.n_restarts = 1;
        let run = run_fit(&config).unwrap();
        let outputs = write_artifacts(&config, &run).unwrap();
        assert_eq!(outputs.len(), 2);
        assert!(!config.output_dir.join(FIT_PLOT_FILE).exists());
        let _ = std::fs::remove_dir_all(&dir);
    }
}

//! Run manifest: a JSON record of what a fit run did.
//!
//! Captures timestamps, inputs, engine diagnostics, and the artifact paths so
//! a results directory can be audited without re-running the fit.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{FitConfig, FitResult, ResidualMode};
use crate::error::AppError;
use crate::fit::{FitDiagnostics, FitOutcome};

pub const MANIFEST_FILE: &str = "run_manifest.json";

#[derive(Debug, Clone, Serialize)]
pub struct RunManifest {
    pub tool: String,
    pub version: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_secs: f64,
    pub data_path: PathBuf,
    pub output_dir: PathBuf,
    pub residual_mode: ResidualMode,
    pub curve_points: usize,
    pub result: FitResult,
    pub diagnostics: FitDiagnostics,
    /// Files written by the run, in write order.
    pub outputs: Vec<PathBuf>,
}

impl RunManifest {
    /// Snapshot a finished run; `finished_at` is taken now.
    pub fn new(config: &FitConfig, outcome: &FitOutcome, started_at: DateTime<Utc>, outputs: Vec<PathBuf>) -> Self {
        let finished_at = Utc::now();
        let elapsed_secs = (finished_at - started_at).num_milliseconds() as f64 / 1000.0;
        Self {
            tool: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at,
            finished_at,
            elapsed_secs,
            data_path: config.data_path.clone(),
            output_dir: config.output_dir.clone(),
            residual_mode: config.residual_mode,
            curve_points: config.curve_points,
            result: outcome.result,
            diagnostics: outcome.diagnostics.clone(),
            outputs,
        }
    }
}

pub fn write_manifest_json(path: &Path, manifest: &RunManifest) -> Result<(), AppError> {
    crate::io::ensure_parent_dir(path)?;
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create manifest '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, manifest)
        .map_err(|e| AppError::new(2, format!("Failed to write manifest JSON: {e}")))?;
    Ok(())
}

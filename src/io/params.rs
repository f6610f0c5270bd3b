//! Read/write the fitted-parameters JSON file.
//!
//! The file holds exactly the keys `theta_deg`, `theta_rad`, `M`, `X`, `l1`
//! (see `domain::FitResult`) so it can be reloaded for plotting.

use std::fs::File;
use std::path::Path;

use crate::domain::FitResult;
use crate::error::AppError;

/// Write `result` as pretty-printed JSON, creating parent directories.
pub fn write_params_json(path: &Path, result: &FitResult) -> Result<(), AppError> {
    crate::io::ensure_parent_dir(path)?;
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create params JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, result)
        .map_err(|e| AppError::new(2, format!("Failed to write params JSON: {e}")))?;
    Ok(())
}

/// Read a params JSON file written by [`write_params_json`].
pub fn read_params_json(path: &Path) -> Result<FitResult, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open params JSON '{}': {e}", path.display())).with_source(e))?;
    let result: FitResult =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid params JSON: {e}")).with_source(e))?;
    Ok(result)
}

//! Export per-point residuals to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::path::Path;

use crate::domain::Residual;
use crate::error::AppError;

/// Write residuals with header `index,x,y,t,curve_x,curve_y,distance`.
pub fn write_residuals_csv(path: &Path, residuals: &[Residual]) -> Result<(), AppError> {
    crate::io::ensure_parent_dir(path)?;
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    for r in residuals {
        writer
            .serialize(r)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

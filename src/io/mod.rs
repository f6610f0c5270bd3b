//! Input/output helpers.
//!
//! - CSV ingest (`load_points`)
//! - params JSON read/write
//! - residual CSV export
//! - run manifest

pub mod export;
pub mod ingest;
pub mod manifest;
pub mod params;

pub use export::*;
pub use ingest::*;
pub use manifest::*;
pub use params::*;

use std::path::Path;

use crate::error::AppError;

/// Create `path`'s parent directory if it has one.
pub(crate) fn ensure_parent_dir(path: &Path) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| AppError::new(2, format!("Failed to create directory '{}': {e}", parent.display())))?;
    }
    Ok(())
}

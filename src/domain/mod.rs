//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - curve parameters and search bounds (`CurveParams`, `Bounds`)
//! - observed points (`ObservedPoint`)
//! - fit outputs (`FitResult`, `Residual`) and run configuration (`FitConfig`)

pub mod types;

pub use types::*;

//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for plotting or comparisons

use std::path::PathBuf;

use clap::ValueEnum;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::models::deg_to_rad;

/// Lower end of the parametric domain.
pub const T_MIN: f64 = 6.0;
/// Upper end of the parametric domain.
pub const T_MAX: f64 = 60.0;

/// One observed `(x, y)` point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservedPoint {
    pub x: f64,
    pub y: f64,
}

impl ObservedPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The three curve parameters.
///
/// `theta_deg` is stored in degrees; the curve formula converts to radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveParams {
    pub theta_deg: f64,
    #[serde(rename = "M")]
    pub m: f64,
    #[serde(rename = "X")]
    pub x: f64,
}

impl CurveParams {
    pub fn new(theta_deg: f64, m: f64, x: f64) -> Self {
        Self { theta_deg, m, x }
    }

    /// Parameter vector in `[theta_deg, M, X]` order, as seen by the minimizers.
    pub fn to_vector(self) -> Vector3<f64> {
        Vector3::new(self.theta_deg, self.m, self.x)
    }

    pub fn from_vector(v: &Vector3<f64>) -> Self {
        Self {
            theta_deg: v[0],
            m: v[1],
            x: v[2],
        }
    }
}

impl Default for CurveParams {
    /// The canonical starting guess.
    fn default() -> Self {
        Self {
            theta_deg: 25.0,
            m: 0.0,
            x: 50.0,
        }
    }
}

/// Closed search interval for one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
}

impl ParamRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Search box for the optimizer.
///
/// Defaults sit strictly inside the validation limits so the search never
/// ties with a boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub theta_deg: ParamRange,
    #[serde(rename = "M")]
    pub m: ParamRange,
    #[serde(rename = "X")]
    pub x: ParamRange,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            theta_deg: ParamRange::new(0.1, 49.9),
            m: ParamRange::new(-0.049, 0.049),
            x: ParamRange::new(0.1, 99.9),
        }
    }
}

impl Bounds {
    /// Ranges in `[theta_deg, M, X]` order.
    pub fn ranges(&self) -> [(&'static str, ParamRange); 3] {
        [("theta_deg", self.theta_deg), ("M", self.m), ("X", self.x)]
    }

    pub fn lower(&self) -> Vector3<f64> {
        Vector3::new(self.theta_deg.min, self.m.min, self.x.min)
    }

    pub fn upper(&self) -> Vector3<f64> {
        Vector3::new(self.theta_deg.max, self.m.max, self.x.max)
    }
}

/// Terminal artifact of a fitting run.
///
/// Serialized with exactly the keys `theta_deg`, `theta_rad`, `M`, `X`, `l1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub theta_deg: f64,
    pub theta_rad: f64,
    #[serde(rename = "M")]
    pub m: f64,
    #[serde(rename = "X")]
    pub x: f64,
    pub l1: f64,
}

impl FitResult {
    /// Package a winning parameter vector and its loss.
    pub fn from_params(params: CurveParams, l1: f64) -> Self {
        Self {
            theta_deg: params.theta_deg,
            theta_rad: deg_to_rad(params.theta_deg),
            m: params.m,
            x: params.x,
            l1,
        }
    }

    pub fn params(&self) -> CurveParams {
        CurveParams::new(self.theta_deg, self.m, self.x)
    }
}

/// How the residual report pairs observations with the curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ResidualMode {
    /// Distance from every observation to its nearest curve sample
    /// (the same computation the loss uses).
    Nearest,
    /// Positional comparison: observation `i` against curve sample `i`, for the
    /// first `n_samples` observations. Only meaningful when the data happen to
    /// be ordered along `t`.
    Indexed,
}

impl ResidualMode {
    pub fn display_name(self) -> &'static str {
        match self {
            ResidualMode::Nearest => "nearest-sample",
            ResidualMode::Indexed => "index-aligned",
        }
    }
}

/// Per-observation residual.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Residual {
    pub index: usize,
    pub x: f64,
    pub y: f64,
    /// Parameter of the curve sample the observation was compared against.
    pub t: f64,
    pub curve_x: f64,
    pub curve_y: f64,
    pub distance: f64,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub data_path: PathBuf,
    pub output_dir: PathBuf,

    pub n_samples: usize,
    pub n_restarts: usize,
    pub seed: u64,
    pub bounds: Bounds,
    pub initial_guess: CurveParams,

    /// Number of t samples used to draw the fitted curve.
    pub curve_points: usize,
    pub residual_mode: ResidualMode,

    pub plots: bool,
    pub export_residuals: bool,

    pub ascii_plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
}

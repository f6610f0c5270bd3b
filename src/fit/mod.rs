//! Curve fitting.
//!
//! Responsibilities:
//!
//! - build the shared `t` sample grid
//! - evaluate the nearest-sample loss
//! - run local restarts plus one global pass and pick the best candidate
//! - validate parameters against their open limits

pub mod bounds;
pub mod fitter;
pub mod grid;
pub mod loss;
pub mod selection;

pub use bounds::*;
pub use fitter::*;
pub use grid::*;
pub use loss::*;
pub use selection::*;

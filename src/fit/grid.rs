//! Sample grid generation.
//!
//! The curve is sampled on a uniform grid of `t` values over `[T_MIN, T_MAX]`.
//! Grids are cheap to build, so callers regenerate them per call instead of
//! caching across different sample counts.

use crate::domain::{T_MAX, T_MIN};

/// `n` evenly spaced values from `start` to `end`, both endpoints included.
///
/// `n = 0` yields an empty grid and `n = 1` yields `[start]`.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n as f64 - 1.0);
            let mut out: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            out[n - 1] = end;
            out
        }
    }
}

/// Uniform `t` grid over the curve's parametric domain.
pub fn sample_grid(n: usize) -> Vec<f64> {
    linspace(T_MIN, T_MAX, n)
}

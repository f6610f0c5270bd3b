//! Parametric curve evaluation.
//!
//! With `θ` in radians:
//!
//! ```text
//! x(t) = t·cos(θ) − exp(M·|t|)·sin(0.3·t)·sin(θ) + X
//! y(t) = 42 + t·sin(θ) + exp(M·|t|)·sin(0.3·t)·cos(θ)
//! ```
//!
//! The fitter relies on `predict` for the loss; plots and residuals reuse it so
//! every consumer sees the same curve.

use crate::domain::CurveParams;

/// Vertical offset of the curve.
const Y_OFFSET: f64 = 42.0;
/// Angular frequency of the oscillating term.
const OSC_FREQ: f64 = 0.3;

pub fn deg_to_rad(degrees: f64) -> f64 {
    degrees.to_radians()
}

pub fn rad_to_deg(radians: f64) -> f64 {
    radians.to_degrees()
}

/// Evaluate the curve at every `t`, returning `(x, y)` of the same length.
pub fn predict(t: &[f64], params: &CurveParams) -> (Vec<f64>, Vec<f64>) {
    let (sin_theta, cos_theta) = deg_to_rad(params.theta_deg).sin_cos();

    let mut xs = Vec::with_capacity(t.len());
    let mut ys = Vec::with_capacity(t.len());
    for &ti in t {
        let (x, y) = eval(ti, sin_theta, cos_theta, params.m, params.x);
        xs.push(x);
        ys.push(y);
    }
    (xs, ys)
}

/// Evaluate the curve at a single `t`.
pub fn predict_point(t: f64, params: &CurveParams) -> (f64, f64) {
    let (sin_theta, cos_theta) = deg_to_rad(params.theta_deg).sin_cos();
    eval(t, sin_theta, cos_theta, params.m, params.x)
}

#[inline]
fn eval(t: f64, sin_theta: f64, cos_theta: f64, m: f64, x_offset: f64) -> (f64, f64) {
    let wobble = (m * t.abs()).exp() * (OSC_FREQ * t).sin();
    let x = t * cos_theta - wobble * sin_theta + x_offset;
    let y = Y_OFFSET + t * sin_theta + wobble * cos_theta;
    (x, y)
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn deg_to_rad_known_angles() {
        assert!(deg_to_rad(0.0).abs() < 1e-9);
        assert!((deg_to_rad(180.0) - PI).abs() < 1e-9);
        assert!((deg_to_rad(90.0) - PI / 2.0).abs() < 1e-9);
    }

    #[test]
    fn rad_to_deg_known_angles() {
        assert!(rad_to_deg(0.0).abs() < 1e-9);
        assert!((rad_to_deg(PI) - 180.0).abs() < 1e-9);
        assert!((rad_to_deg(PI / 2.0) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn predict_preserves_length() {
        let t = [10.0, 20.0, 30.0, 40.0, 50.0];
        let (x, y) = predict(&t, &CurveParams::new(25.0, 0.01, 50.0));
        assert_eq!(x.len(), 5);
        assert_eq!(y.len(), 5);
    }

    #[test]
    fn predict_empty_input_is_empty() {
        let (x, y) = predict(&[], &CurveParams::default());
        assert!(x.is_empty() && y.is_empty());
    }

    #[test]
    fn flat_angle_without_growth_reduces_to_shifted_sine() {
        // θ = 0, M = 0: x = t + X, y = 42 + sin(0.3 t).
        let params = CurveParams::new(0.0, 0.0, 50.0);
        let (x, y) = predict_point(10.0, &params);
        assert!((x - 60.0).abs() < 1e-12);
        assert!((y - (42.0 + 3.0_f64.sin())).abs() < 1e-12);
    }

    #[test]
    fn predict_point_matches_vector_form() {
        let params = CurveParams::new(31.0, -0.02, 12.5);
        let t = [6.0, 17.5, 60.0];
        let (xs, ys) = predict(&t, &params);
        for (i, &ti) in t.iter().enumerate() {
            let (x, y) = predict_point(ti, &params);
            assert_eq!(x, xs[i]);
            assert_eq!(y, ys[i]);
        }
    }

    proptest! {
        #[test]
        fn predict_is_finite_on_valid_domain(
            t in proptest::collection::vec(6.0f64..=60.0, 1..64),
            theta_deg in 0.0f64..50.0,
            m in -0.05f64..0.05,
            x_offset in 0.0f64..100.0,
        ) {
            let (x, y) = predict(&t, &CurveParams::new(theta_deg, m, x_offset));
            prop_assert_eq!(x.len(), t.len());
            prop_assert_eq!(y.len(), t.len());
            prop_assert!(x.iter().chain(y.iter()).all(|v| v.is_finite()));
        }
    }
}

//! Reporting utilities: residuals, summary statistics, and formatted terminal output.

pub mod format;

pub use format::*;

use serde::Serialize;

use crate::domain::{FitResult, ObservedPoint, Residual, ResidualMode};
use crate::error::AppError;
use crate::fit::{nearest_sample, sample_grid};
use crate::models::predict;

/// Pair observations with the fitted curve sampled on an `n_samples` grid.
///
/// `Nearest` reports every observation against its closest sample (the loss
/// computation). `Indexed` compares observation `i` with sample `i` for the
/// first `min(len, n_samples)` observations.
pub fn compute_residuals(
    points: &[ObservedPoint],
    fit: &FitResult,
    n_samples: usize,
    mode: ResidualMode,
) -> Result<Vec<Residual>, AppError> {
    if n_samples == 0 {
        return Err(AppError::new(2, "Sample count must be >= 1."));
    }
    let t = sample_grid(n_samples);
    let (curve_x, curve_y) = predict(&t, &fit.params());
    if curve_x.iter().chain(&curve_y).any(|v| !v.is_finite()) {
        return Err(AppError::new(4, "Non-finite curve prediction during residual computation."));
    }

    let residuals = match mode {
        ResidualMode::Nearest => points
            .iter()
            .enumerate()
            .filter_map(|(index, p)| {
                let (j, distance) = nearest_sample(&curve_x, &curve_y, p)?;
                Some(Residual {
                    index,
                    x: p.x,
                    y: p.y,
                    t: t[j],
                    curve_x: curve_x[j],
                    curve_y: curve_y[j],
                    distance,
                })
            })
            .collect(),
        ResidualMode::Indexed => points
            .iter()
            .zip(t.iter().zip(curve_x.iter().zip(&curve_y)))
            .enumerate()
            .map(|(index, (p, (&ti, (&cx, &cy))))| Residual {
                index,
                x: p.x,
                y: p.y,
                t: ti,
                curve_x: cx,
                curve_y: cy,
                distance: (p.x - cx).hypot(p.y - cy),
            })
            .collect(),
    };
    Ok(residuals)
}

/// Distribution of residual distances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResidualSummary {
    pub n: usize,
    pub mean: f64,
    pub median: f64,
    pub rms: f64,
    pub max: f64,
}

/// Summarize residual distances; `None` when there are none.
pub fn summarize(residuals: &[Residual]) -> Option<ResidualSummary> {
    if residuals.is_empty() {
        return None;
    }
    let n = residuals.len();
    let mut d: Vec<f64> = residuals.iter().map(|r| r.distance).collect();
    let mean = d.iter().sum::<f64>() / n as f64;
    let rms = (d.iter().map(|v| v * v).sum::<f64>() / n as f64).sqrt();
    let max = d.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    d.sort_by(|a, b| a.total_cmp(b));
    let mid = n / 2;
    let median = if n % 2 == 0 { 0.5 * (d[mid - 1] + d[mid]) } else { d[mid] };

    Some(ResidualSummary {
        n,
        mean,
        median,
        rms,
        max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CurveParams;
    use crate::fit::l1_loss;
    use crate::models::predict_point;

    fn fit_result() -> FitResult {
        FitResult::from_params(CurveParams::new(20.0, 0.005, 40.0), 0.0)
    }

    #[test]
    fn nearest_mean_matches_loss() {
        let fit = fit_result();
        let points = vec![
            ObservedPoint::new(50.0, 45.0),
            ObservedPoint::new(60.0, 55.0),
            ObservedPoint::new(80.0, 60.0),
        ];
        let residuals = compute_residuals(&points, &fit, 40, ResidualMode::Nearest).unwrap();
        assert_eq!(residuals.len(), 3);
        let summary = summarize(&residuals).unwrap();
        let loss = l1_loss(&fit.params(), &sample_grid(40), &points);
        assert!((summary.mean - loss).abs() < 1e-12);
    }

    #[test]
    fn nearest_reports_matching_sample() {
        let fit = fit_result();
        let t = sample_grid(10);
        let (x, y) = predict_point(t[3], &fit.params());
        let residuals = compute_residuals(&[ObservedPoint::new(x, y)], &fit, 10, ResidualMode::Nearest).unwrap();
        assert_eq!(residuals[0].t, t[3]);
        assert_eq!(residuals[0].distance, 0.0);
    }

    #[test]
    fn indexed_truncates_to_sample_count() {
        let fit = fit_result();
        let points: Vec<ObservedPoint> = (0..8).map(|i| ObservedPoint::new(i as f64, 42.0)).collect();
        let residuals = compute_residuals(&points, &fit, 5, ResidualMode::Indexed).unwrap();
        assert_eq!(residuals.len(), 5);
        assert_eq!(residuals[4].index, 4);
        assert_eq!(residuals[4].t, sample_grid(5)[4]);

        let fewer = compute_residuals(&points[..3], &fit, 5, ResidualMode::Indexed).unwrap();
        assert_eq!(fewer.len(), 3);
    }

    #[test]
    fn zero_samples_is_rejected() {
        let err = compute_residuals(&[], &fit_result(), 0, ResidualMode::Nearest).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn summary_statistics() {
        let make = |distance| Residual {
            index: 0,
            x: 0.0,
            y: 0.0,
            t: 6.0,
            curve_x: 0.0,
            curve_y: 0.0,
            distance,
        };
        let s = summarize(&[make(3.0), make(1.0), make(2.0), make(4.0)]).unwrap();
        assert_eq!(s.n, 4);
        assert_eq!(s.mean, 2.5);
        assert_eq!(s.median, 2.5);
        assert_eq!(s.max, 4.0);
        assert!((s.rms - 7.5f64.sqrt()).abs() < 1e-12);
        assert!(summarize(&[]).is_none());
    }
}

//! Fitting objective: mean nearest-sample distance.
//!
//! For every observed point we take the Euclidean distance to the closest
//! sampled curve point (all pairs, no segment projection) and average those
//! minima. The loss is asymmetric: curve samples with no nearby observation
//! cost nothing, so the sampling density directly affects both accuracy and
//! runtime (`O(|observed| × |t_samples|)`).

use crate::domain::{CurveParams, ObservedPoint};
use crate::models::predict;

/// Index of the closest curve sample to `point` and its distance.
///
/// Ties resolve to the lowest index. A NaN distance is kept only until any
/// comparable sample appears. Returns `None` for an empty curve.
pub fn nearest_sample(curve_x: &[f64], curve_y: &[f64], point: &ObservedPoint) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, (&cx, &cy)) in curve_x.iter().zip(curve_y).enumerate() {
        let dx = cx - point.x;
        let dy = cy - point.y;
        let d2 = dx * dx + dy * dy;
        match best {
            Some((_, b)) if !(d2 < b || b.is_nan()) => {}
            _ => best = Some((i, d2)),
        }
    }
    best.map(|(i, d2)| (i, d2.sqrt()))
}

/// Mean nearest-sample distance of `observed` to a pre-sampled curve.
///
/// NaN when either side is empty.
pub fn mean_nearest_distance(curve_x: &[f64], curve_y: &[f64], observed: &[ObservedPoint]) -> f64 {
    if curve_x.is_empty() {
        return f64::NAN;
    }
    let total: f64 = observed
        .iter()
        .filter_map(|p| nearest_sample(curve_x, curve_y, p))
        .map(|(_, d)| d)
        .sum();
    total / observed.len() as f64
}

/// Loss of `params` against `observed`, with the curve sampled at `t_samples`.
pub fn l1_loss(params: &CurveParams, t_samples: &[f64], observed: &[ObservedPoint]) -> f64 {
    let (curve_x, curve_y) = predict(t_samples, params);
    mean_nearest_distance(&curve_x, &curve_y, observed)
}

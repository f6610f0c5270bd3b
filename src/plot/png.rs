//! PNG charts rendered with Plotters.
//!
//! Two charts are produced per run:
//! - the observed scatter with the fitted curve on top
//! - residual diagnostics: residual vs. index, and a histogram with the mean marked
//!
//! Plotters has no built-in font, so captions, axis descriptions and tick
//! labels are only drawn when the crate is built with the `ttf` feature.
//! Without it no text call reaches the backend and the charts are unlabeled.

use std::path::Path;

use plotters::coord::Shift;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;

use crate::domain::{FitResult, ObservedPoint, Residual, ResidualMode};
use crate::error::AppError;
use crate::fit::sample_grid;
use crate::models::predict;

pub const FIT_PLOT_SIZE: (u32, u32) = (1000, 800);
pub const RESIDUAL_PLOT_SIZE: (u32, u32) = (1400, 500);
pub const HISTOGRAM_BINS: usize = 30;

const POINT_COLOR: RGBColor = RGBColor(0x1f, 0x77, 0xb4);
const CURVE_COLOR: RGBColor = RGBColor(0xd6, 0x27, 0x28);
const BAR_COLOR: RGBColor = RGBColor(0x2c, 0xa0, 0x2c);

#[cfg(feature = "ttf")]
const CAPTION_STYLE: (&str, i32) = ("sans-serif", 24);

/// Observed points plus the fitted curve sampled at `curve_points` t values.
pub fn render_fit_plot(
    path: &Path,
    points: &[ObservedPoint],
    fit: &FitResult,
    curve_points: usize,
) -> Result<(), AppError> {
    crate::io::ensure_parent_dir(path)?;
    let t = sample_grid(curve_points.max(2));
    let (cx, cy) = predict(&t, &fit.params());
    let curve: Vec<(f64, f64)> = cx.into_iter().zip(cy).collect();

    let root = BitMapBackend::new(path, FIT_PLOT_SIZE).into_drawing_area();
    draw_fit(root, points, &curve, fit).map_err(|e| plot_error(path, e))
}

/// Residual vs. index on the left, distance histogram on the right.
pub fn render_residual_plot(path: &Path, residuals: &[Residual], mode: ResidualMode) -> Result<(), AppError> {
    crate::io::ensure_parent_dir(path)?;
    let root = BitMapBackend::new(path, RESIDUAL_PLOT_SIZE).into_drawing_area();
    draw_residuals(root, residuals, mode).map_err(|e| plot_error(path, e))
}

fn plot_error<E: std::error::Error + Send + Sync>(path: &Path, err: DrawingAreaErrorKind<E>) -> AppError {
    AppError::new(2, format!("Failed to render plot '{}': {err}", path.display()))
}

fn draw_fit<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    points: &[ObservedPoint],
    curve: &[(f64, f64)],
    fit: &FitResult,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let xs = points.iter().map(|p| p.x).chain(curve.iter().map(|c| c.0));
    let ys = points.iter().map(|p| p.y).chain(curve.iter().map(|c| c.1));
    let (x0, x1) = padded_range(xs, 0.05);
    let (y0, y1) = padded_range(ys, 0.05);

    let caption = format!(
        "θ={:.4}°  M={:.5}  X={:.4}  L1={:.5}",
        fit.theta_deg, fit.m, fit.x, fit.l1
    );
    let mut builder = ChartBuilder::on(&root);
    builder.margin(20);
    label_areas(&mut builder, &caption);
    let mut chart = builder.build_cartesian_2d(x0..x1, y0..y1)?;
    draw_mesh(&mut chart, "x", "y")?;

    chart.draw_series(
        points
            .iter()
            .map(|p| Circle::new((p.x, p.y), 2, POINT_COLOR.mix(0.5).filled())),
    )?;
    chart.draw_series(LineSeries::new(curve.iter().copied(), CURVE_COLOR.stroke_width(2)))?;

    root.present()?;
    Ok(())
}

fn draw_residuals<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    residuals: &[Residual],
    mode: ResidualMode,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;
    let (left, right) = root.split_horizontally((RESIDUAL_PLOT_SIZE.0 / 2) as i32);

    let distances: Vec<f64> = residuals.iter().map(|r| r.distance).collect();

    // Residual vs. index.
    let n = distances.len().max(1) as f64;
    let (d0, d1) = padded_range(distances.iter().copied(), 0.05);
    let mut builder = ChartBuilder::on(&left);
    builder.margin(20);
    label_areas(&mut builder, &format!("Residuals ({})", mode.display_name()));
    let mut chart = builder.build_cartesian_2d(0.0..n, d0..d1)?;
    draw_mesh(&mut chart, "index", "distance")?;

    let series: Vec<(f64, f64)> = residuals.iter().map(|r| (r.index as f64, r.distance)).collect();
    chart.draw_series(LineSeries::new(series.iter().copied(), POINT_COLOR.mix(0.6)))?;
    chart.draw_series(series.iter().map(|&p| Circle::new(p, 2, POINT_COLOR.filled())))?;

    // Histogram with the mean marked.
    let Some(hist) = Histogram::new(&distances, HISTOGRAM_BINS) else {
        root.present()?;
        return Ok(());
    };
    let max_count = hist.counts.iter().copied().max().unwrap_or(0).max(1) as f64;
    let mut builder = ChartBuilder::on(&right);
    builder.margin(20);
    label_areas(&mut builder, "Distribution");
    let mut chart = builder.build_cartesian_2d(hist.lo..hist.hi, 0.0..max_count * 1.1)?;
    draw_mesh(&mut chart, "distance", "count")?;

    chart.draw_series(hist.counts.iter().enumerate().map(|(i, &count)| {
        let (a, b) = hist.bin_edges(i);
        Rectangle::new([(a, 0.0), (b, count as f64)], BAR_COLOR.mix(0.7).filled())
    }))?;

    let mean = distances.iter().sum::<f64>() / distances.len() as f64;
    chart.draw_series(std::iter::once(PathElement::new(
        vec![(mean, 0.0), (mean, max_count * 1.1)],
        CURVE_COLOR.stroke_width(2),
    )))?;

    root.present()?;
    Ok(())
}

#[cfg(feature = "ttf")]
fn label_areas<DB: DrawingBackend>(builder: &mut ChartBuilder<'_, '_, DB>, caption: &str) {
    builder
        .caption(caption, CAPTION_STYLE)
        .set_label_area_size(LabelAreaPosition::Left, 50)
        .set_label_area_size(LabelAreaPosition::Bottom, 40);
}

#[cfg(not(feature = "ttf"))]
fn label_areas<DB: DrawingBackend>(_builder: &mut ChartBuilder<'_, '_, DB>, _caption: &str) {}

#[cfg(feature = "ttf")]
fn draw_mesh<DB: DrawingBackend>(
    chart: &mut ChartContext<'_, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    x_desc: &str,
    y_desc: &str,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    chart.configure_mesh().x_desc(x_desc).y_desc(y_desc).draw()
}

// Mesh drawing lays out tick labels, which needs a font.
#[cfg(not(feature = "ttf"))]
fn draw_mesh<DB: DrawingBackend>(
    _chart: &mut ChartContext<'_, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    _x_desc: &str,
    _y_desc: &str,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    Ok(())
}

/// Equal-width bins over `[min, max]`; the last bin includes `max`.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub lo: f64,
    pub hi: f64,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// `None` when there are no finite values or `bins == 0`.
    pub fn new(values: &[f64], bins: usize) -> Option<Self> {
        if bins == 0 {
            return None;
        }
        let finite = || values.iter().copied().filter(|v| v.is_finite());
        let mut lo = finite().reduce(f64::min)?;
        let mut hi = finite().reduce(f64::max)?;
        if hi <= lo {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let mut counts = vec![0; bins];
        for v in finite() {
            let idx = (((v - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }
        Some(Self { lo, hi, counts })
    }

    pub fn bin_edges(&self, i: usize) -> (f64, f64) {
        let width = (self.hi - self.lo) / self.counts.len() as f64;
        (self.lo + width * i as f64, self.lo + width * (i + 1) as f64)
    }
}

/// Range of the finite values, widened by `frac` of the span on both sides.
fn padded_range(values: impl Iterator<Item = f64>, frac: f64) -> (f64, f64) {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !(min.is_finite() && max.is_finite()) {
        return (0.0, 1.0);
    }
    let span = max - min;
    let pad = if span > 0.0 { span * frac } else { 1.0 };
    (min - pad, max + pad)
}

//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed points: `o`
//! - fitted curve: `-` line through consecutive samples

use crate::domain::{FitResult, ObservedPoint};
use crate::fit::sample_grid;
use crate::models::predict;

/// Render observed points with an optional fitted curve on top.
pub fn render_ascii_plot(
    points: &[ObservedPoint],
    fit: Option<&FitResult>,
    curve_points: usize,
    width: usize,
    height: usize,
) -> String {
    let curve: Option<Vec<(f64, f64)>> = fit.map(|f| {
        let t = sample_grid(curve_points.max(2));
        let (xs, ys) = predict(&t, &f.params());
        xs.into_iter().zip(ys).collect()
    });
    render_plot(points, curve.as_deref(), width, height)
}

fn render_plot(points: &[ObservedPoint], curve: Option<&[(f64, f64)]>, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let all = || {
        points
            .iter()
            .map(|p| (p.x, p.y))
            .chain(curve.unwrap_or(&[]).iter().copied())
    };
    let (x_min, x_max) = range(all().map(|(x, _)| x)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = range(all().map(|(_, y)| y)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Curve first so points overlay it.
    if let Some(curve) = curve {
        draw_curve(&mut grid, curve, (x_min, x_max), (y_min, y_max));
    }

    for p in points {
        if !(p.x.is_finite() && p.y.is_finite()) {
            continue;
        }
        let col = map_x(p.x, x_min, x_max, width);
        let row = map_y(p.y, y_min, y_max, height);
        grid[row][col] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: x=[{x_min:.3}, {x_max:.3}] | y=[{y_min:.2}, {y_max:.2}]\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values.filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    if min.is_finite() && max.is_finite() && max > min {
        Some((min, max))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y max is row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], x_range: (f64, f64), y_range: (f64, f64)) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        if !(x.is_finite() && y.is_finite()) {
            prev = None;
            continue;
        }
        let col = map_x(x, x_range.0, x_range.1, width);
        let row = map_y(y, y_range.0, y_range.1, height);
        if let Some((c0, r0)) = prev {
            draw_line(grid, c0, r0, col, row, '-');
        } else {
            grid[row][col] = '-';
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CurveParams;

    #[test]
    fn plot_golden_snapshot_points_only() {
        let points = vec![
            ObservedPoint::new(0.0, 0.0),
            ObservedPoint::new(4.5, 2.0),
            ObservedPoint::new(9.0, 4.0),
        ];
        let txt = render_ascii_plot(&points, None, 500, 10, 5);
        let expected = concat!(
            "Plot: x=[0.000, 9.000] | y=[-0.20, 4.20]\n",
            "         o\n",
            "          \n",
            "     o    \n",
            "          \n",
            "o         \n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn curve_is_drawn_under_points() {
        let fit = FitResult::from_params(CurveParams::new(20.0, 0.01, 50.0), 0.0);
        let points = vec![ObservedPoint::new(60.0, 50.0), ObservedPoint::new(90.0, 60.0)];
        let txt = render_ascii_plot(&points, Some(&fit), 200, 40, 12);
        let body: String = txt.lines().skip(1).collect();
        assert_eq!(txt.lines().count(), 13);
        assert!(body.chars().filter(|&c| c == '-').count() > 20);
        assert_eq!(body.chars().filter(|&c| c == 'o').count(), 2);
    }

    #[test]
    fn empty_input_renders_blank_grid() {
        let txt = render_ascii_plot(&[], None, 10, 3, 2);
        // Sizes are clamped to a minimum of 10 x 5.
        assert_eq!(txt.lines().count(), 6);
        assert!(txt.lines().skip(1).all(|l| l.trim().is_empty()));
    }
}

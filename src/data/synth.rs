//! Synthetic point sets drawn from a known curve.
//!
//! Points are the curve sampled on a uniform `t` grid with independent
//! Gaussian noise on both coordinates. Used by `xyfit synth` and by the fit
//! recovery tests.

use std::path::Path;

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{CurveParams, ObservedPoint};
use crate::error::AppError;
use crate::fit::sample_grid;
use crate::models::predict;

#[derive(Debug, Clone)]
pub struct SynthOptions {
    pub params: CurveParams,
    pub n_points: usize,
    /// Standard deviation of the noise added to `x` and `y`.
    pub noise: f64,
    pub seed: u64,
    /// Shuffle the output so row order carries no `t` information.
    pub shuffle: bool,
}

impl Default for SynthOptions {
    fn default() -> Self {
        Self {
            params: CurveParams::new(25.0, 0.01, 50.0),
            n_points: 100,
            noise: 0.1,
            seed: 42,
            shuffle: false,
        }
    }
}

/// Sample the curve and perturb it.
///
/// All `x` noise is drawn before any `y` noise.
pub fn generate(options: &SynthOptions) -> Result<Vec<ObservedPoint>, AppError> {
    if options.n_points == 0 {
        return Err(AppError::new(2, "Point count must be > 0."));
    }
    if !(options.noise.is_finite() && options.noise >= 0.0) {
        return Err(AppError::new(
            2,
            format!("Noise level must be a finite value >= 0, got {}.", options.noise),
        ));
    }
    let normal = Normal::new(0.0, options.noise)
        .map_err(|e| AppError::new(2, format!("Invalid noise level {}: {e}", options.noise)))?;
    let mut rng = StdRng::seed_from_u64(options.seed);

    let t = sample_grid(options.n_points);
    let (xs, ys) = predict(&t, &options.params);
    let x_noise: Vec<f64> = (0..xs.len()).map(|_| normal.sample(&mut rng)).collect();
    let y_noise: Vec<f64> = (0..ys.len()).map(|_| normal.sample(&mut rng)).collect();

    let mut points: Vec<ObservedPoint> = xs
        .iter()
        .zip(&ys)
        .zip(x_noise.iter().zip(&y_noise))
        .map(|((&x, &y), (&nx, &ny))| ObservedPoint::new(x + nx, y + ny))
        .collect();

    if options.shuffle {
        points.shuffle(&mut rng);
    }
    Ok(points)
}

/// Write points as a two-column `x,y` CSV, creating parent directories.
pub fn write_points_csv(path: &Path, points: &[ObservedPoint]) -> Result<(), AppError> {
    crate::io::ensure_parent_dir(path)?;
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create CSV '{}': {e}", path.display())))?;
    for p in points {
        writer
            .serialize(p)
            .map_err(|e| AppError::new(2, format!("Failed to write CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush CSV '{}': {e}", path.display())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::l1_loss;

    #[test]
    fn noiseless_points_lie_on_the_curve() {
        let options = SynthOptions {
            noise: 0.0,
            n_points: 30,
            ..Default::default()
        };
        let points = generate(&options).unwrap();
        assert_eq!(points.len(), 30);
        let loss = l1_loss(&options.params, &sample_grid(30), &points);
        assert!(loss < 1e-9, "loss = {loss}");
    }

    #[test]
    fn same_seed_same_points() {
        let a = generate(&SynthOptions::default()).unwrap();
        let b = generate(&SynthOptions::default()).unwrap();
        assert_eq!(a, b);
        let c = generate(&SynthOptions {
            seed: 7,
            ..Default::default()
        })
        .unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn shuffle_permutes_rows() {
        let ordered = generate(&SynthOptions::default()).unwrap();
        let shuffled = generate(&SynthOptions {
            shuffle: true,
            ..Default::default()
        })
        .unwrap();
        assert_ne!(ordered, shuffled);
        let key = |p: &ObservedPoint| (p.x.to_bits(), p.y.to_bits());
        let mut a: Vec<_> = ordered.iter().map(key).collect();
        let mut b: Vec<_> = shuffled.iter().map(key).collect();
        a.sort_unstable();
        b.sort_unstable();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_bad_inputs() {
        let zero = SynthOptions {
            n_points: 0,
            ..Default::default()
        };
        assert_eq!(generate(&zero).unwrap_err().exit_code(), 2);
        let negative = SynthOptions {
            noise: -1.0,
            ..Default::default()
        };
        assert_eq!(generate(&negative).unwrap_err().exit_code(), 2);
        let non_finite = SynthOptions {
            noise: f64::NAN,
            ..Default::default()
        };
        assert_eq!(generate(&non_finite).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn zero_noise_reproduces_the_curve() {
        let options = SynthOptions {
            noise: 0.0,
            n_points: 12,
            ..Default::default()
        };
        let points = generate(&options).unwrap();
        let (xs, ys) = predict(&sample_grid(12), &options.params);
        for (p, (x, y)) in points.iter().zip(xs.iter().zip(&ys)) {
            assert_eq!((p.x, p.y), (*x, *y));
        }
    }

    #[test]
    fn csv_has_xy_header() {
        let dir = std::env::temp_dir().join(format!("xyfit-synth-{}", std::process::id()));
        let path = dir.join("nested").join("points.csv");
        let points = vec![ObservedPoint::new(1.5, 2.5), ObservedPoint::new(-3.0, 4.0)];
        write_points_csv(&path, &points).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("x,y"));
        assert_eq!(lines.next(), Some("1.5,2.5"));
        assert_eq!(lines.next(), Some("-3.0,4.0"));
        let _ = std::fs::remove_dir_all(&dir);
    }
}

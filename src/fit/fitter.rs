//! Multi-start curve fitting.
//!
//! Given observed points and a search box, we:
//! - sample the curve on one shared `t` grid
//! - run bounded Nelder–Mead from the initial guess and from random starts
//! - run one differential evolution pass over the same box
//!
//! and return the lowest-loss candidate. Restarts run in parallel, but every
//! random draw comes from generators seeded with `seed` before any work is
//! dispatched, so the result does not depend on thread count.

use nalgebra::Vector3;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::{Bounds, CurveParams, FitResult, ObservedPoint};
use crate::error::AppError;
use crate::fit::bounds::validate_params;
use crate::fit::grid::sample_grid;
use crate::fit::loss::l1_loss;
use crate::fit::selection::{BestSoFar, Candidate, Stage};
use crate::math::{DifferentialEvolutionConfig, NelderMeadConfig, differential_evolution, nelder_mead};

/// Engine-level options.
#[derive(Debug, Clone)]
pub struct FitOptions {
    /// Number of `t` samples used by the loss.
    pub n_samples: usize,
    pub bounds: Bounds,
    /// Start of restart 0; clipped into `bounds` if needed.
    pub initial_guess: CurveParams,
    /// Number of local restarts (restart 0 uses the initial guess).
    pub n_restarts: usize,
    pub seed: u64,
    pub local: NelderMeadConfig,
    pub global: DifferentialEvolutionConfig,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            n_samples: 100,
            bounds: Bounds::default(),
            initial_guess: CurveParams::default(),
            n_restarts: 10,
            seed: 42,
            local: NelderMeadConfig::default(),
            global: DifferentialEvolutionConfig::default(),
        }
    }
}

/// Outcome of one search stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StageRecord {
    pub stage: Stage,
    /// Starting point for local restarts; `None` for the global pass.
    pub start: Option<CurveParams>,
    pub params: CurveParams,
    pub loss: f64,
    /// Simplex iterations (local) or generations (global).
    pub iterations: usize,
    pub evals: usize,
    pub converged: bool,
}

impl StageRecord {
    fn candidate(&self) -> Candidate {
        Candidate {
            stage: self.stage,
            params: self.params,
            loss: self.loss,
        }
    }
}

/// Everything the engine learned along the way.
#[derive(Debug, Clone, Serialize)]
pub struct FitDiagnostics {
    pub n_points: usize,
    pub n_samples: usize,
    pub seed: u64,
    pub bounds: Bounds,
    pub initial_guess: CurveParams,
    /// `true` when the initial guess had to be clipped into `bounds`.
    pub initial_guess_clipped: bool,
    pub restarts: Vec<StageRecord>,
    pub global: StageRecord,
    /// Whether DE's local polish improved on its best member.
    pub global_polished: bool,
    pub winner: Stage,
    /// Result of the final open-interval validation.
    pub within_bounds: bool,
}

#[derive(Debug, Clone)]
pub struct FitOutcome {
    pub result: FitResult,
    pub diagnostics: FitDiagnostics,
}

/// Fit the curve to `points`.
pub fn fit(points: &[ObservedPoint], options: &FitOptions) -> Result<FitResult, AppError> {
    fit_with_diagnostics(points, options).map(|outcome| outcome.result)
}

/// Starting points for the local restarts.
///
/// Restart 0 is `initial_guess`; every other start draws `theta_deg`, `M`, `X`
/// uniformly within `bounds`, in that order.
pub fn restart_plan(initial_guess: CurveParams, bounds: &Bounds, n_restarts: usize, rng: &mut StdRng) -> Vec<CurveParams> {
    let search_box = bounds.search_box();
    (0..n_restarts)
        .map(|i| {
            if i == 0 {
                initial_guess
            } else {
                CurveParams::from_vector(&search_box.sample(rng))
            }
        })
        .collect()
}

/// Fit the curve and keep per-stage diagnostics.
pub fn fit_with_diagnostics(points: &[ObservedPoint], options: &FitOptions) -> Result<FitOutcome, AppError> {
    if points.is_empty() {
        return Err(AppError::new(3, "No observed points to fit."));
    }
    if options.n_samples == 0 {
        return Err(AppError::new(2, "Sample count must be >= 1."));
    }
    options.bounds.check()?;

    let bounds = options.bounds;
    let search_box = bounds.search_box();
    let t_samples = sample_grid(options.n_samples);
    let objective = |v: &Vector3<f64>| l1_loss(&CurveParams::from_vector(v), &t_samples, points);

    let initial_guess_clipped = !bounds.contains(&options.initial_guess);
    let guess = bounds.clip(&options.initial_guess);
    if initial_guess_clipped {
        warn!(
            requested = ?options.initial_guess,
            clipped = ?guess,
            "Initial guess outside search bounds; clipped"
        );
    }

    let mut rng = StdRng::seed_from_u64(options.seed);
    let starts = restart_plan(guess, &bounds, options.n_restarts, &mut rng);

    info!(
        n_points = points.len(),
        n_samples = options.n_samples,
        seed = options.seed,
        "Starting optimization with {} restarts",
        options.n_restarts
    );

    let restarts: Vec<StageRecord> = starts
        .par_iter()
        .enumerate()
        .map(|(i, start)| {
            debug!(
                restart = i + 1,
                theta_deg = start.theta_deg,
                m = start.m,
                x = start.x,
                "Restart {}/{} starting",
                i + 1,
                options.n_restarts
            );
            let run = nelder_mead(&objective, &start.to_vector(), &search_box, &options.local);
            StageRecord {
                stage: Stage::Restart(i),
                start: Some(*start),
                params: CurveParams::from_vector(&run.x),
                loss: run.fval,
                iterations: run.iterations,
                evals: run.evals,
                converged: run.converged,
            }
        })
        .collect();

    let mut best = BestSoFar::new();
    for record in &restarts {
        if !record.converged {
            debug!(restart = %record.stage.label(), "Local search stopped on its iteration cap");
        }
        if best.offer(record.candidate()) {
            if let Stage::Restart(i) = record.stage {
                info!("Restart {}/{}: New best L1 = {:.6}", i + 1, options.n_restarts, record.loss);
            }
        }
    }

    info!("Running differential evolution for global search");
    let mut global_rng = StdRng::seed_from_u64(options.seed);
    let de = differential_evolution(&objective, &search_box, &mut global_rng, &options.global);
    let global = StageRecord {
        stage: Stage::Global,
        start: None,
        params: CurveParams::from_vector(&de.x),
        loss: de.fval,
        iterations: de.generations,
        evals: de.evals,
        converged: de.converged,
    };
    debug!(
        generations = de.generations,
        evals = de.evals,
        converged = de.converged,
        polished = de.polished,
        "Differential evolution finished"
    );
    if best.offer(global.candidate()) {
        info!("Differential evolution: New best L1 = {:.6}", global.loss);
    }

    let winner = best
        .into_best()
        .ok_or_else(|| AppError::new(4, "Optimization produced no finite loss value."))?;

    let within_bounds = validate_params(&winner.params);
    if !within_bounds {
        warn!(params = ?winner.params, "Optimal parameters are outside expected bounds");
    }

    let result = FitResult::from_params(winner.params, winner.loss);
    info!(
        "Optimization complete: θ={:.4}°, M={:.6}, X={:.4}, L1={:.6}",
        result.theta_deg, result.m, result.x, result.l1
    );

    Ok(FitOutcome {
        result,
        diagnostics: FitDiagnostics {
            n_points: points.len(),
            n_samples: options.n_samples,
            seed: options.seed,
            bounds,
            initial_guess: guess,
            initial_guess_clipped,
            restarts,
            global,
            global_polished: de.polished,
            winner: winner.stage,
            within_bounds,
        },
    })
}

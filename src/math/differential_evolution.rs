//! Bounded differential evolution (`best1bin`).
//!
//! The population lives in the unit cube and is mapped onto the search box
//! for evaluation. Each generation builds every trial vector sequentially from
//! the caller's generator, then evaluates the whole batch with rayon. Results
//! are collected in population order, so the run is reproducible for a given
//! seed regardless of thread count.

use nalgebra::SVector;
use rand::Rng;
use rand::seq::SliceRandom;
use rayon::prelude::*;

use crate::math::{NelderMeadConfig, SearchBox, nelder_mead};

/// Minimum population size regardless of dimension.
const MIN_POPULATION: usize = 5;

/// Configuration for differential evolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifferentialEvolutionConfig {
    /// Maximum number of generations.
    pub max_iter: usize,
    /// Population size multiplier (population = `popsize * D`).
    pub popsize: usize,
    /// Mutation constant range; a fresh value is drawn each generation.
    pub mutation: (f64, f64),
    /// Crossover probability.
    pub recombination: f64,
    /// Relative convergence tolerance on the population energy spread.
    pub tol: f64,
    /// Absolute convergence tolerance on the population energy spread.
    pub atol: f64,
    /// Local refinement of the final best member.
    pub polish: Option<NelderMeadConfig>,
}

impl Default for DifferentialEvolutionConfig {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            popsize: 15,
            mutation: (0.5, 1.0),
            recombination: 0.7,
            tol: 1e-6,
            atol: 1e-6,
            polish: Some(NelderMeadConfig::default()),
        }
    }
}

/// Best member found by a differential evolution run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifferentialEvolutionResult<const D: usize> {
    pub x: SVector<f64, D>,
    pub fval: f64,
    pub generations: usize,
    pub evals: usize,
    /// `false` when the run stopped on the generation cap.
    pub converged: bool,
    /// `true` when polishing improved on the best population member.
    pub polished: bool,
}

/// Minimize `objective` over `bounds`.
///
/// Every random draw comes from `rng`, so seeding it fixes the result.
pub fn differential_evolution<const D: usize, F, R>(
    objective: F,
    bounds: &SearchBox<D>,
    rng: &mut R,
    config: &DifferentialEvolutionConfig,
) -> DifferentialEvolutionResult<D>
where
    F: Fn(&SVector<f64, D>) -> f64 + Sync,
    R: Rng + ?Sized,
{
    let n = (config.popsize * D).max(MIN_POPULATION);
    let energy = |u: &SVector<f64, D>| {
        let e = objective(&bounds.from_unit(u));
        if e.is_nan() { f64::INFINITY } else { e }
    };

    let mut population = latin_hypercube::<D, R>(n, rng);
    let mut energies: Vec<f64> = population.par_iter().map(&energy).collect();
    let mut evals = n;
    promote_lowest(&mut population, &mut energies);

    let mut generations = 0;
    let mut converged = false;

    for _ in 0..config.max_iter {
        generations += 1;
        let (lo, hi) = config.mutation;
        let scale = if hi > lo { rng.gen_range(lo..hi) } else { lo };

        let trials: Vec<SVector<f64, D>> = (0..n)
            .map(|candidate| {
                let trial = best1bin(&population, candidate, scale, config.recombination, rng);
                ensure_in_unit_cube(trial, rng)
            })
            .collect();
        let trial_energies: Vec<f64> = trials.par_iter().map(&energy).collect();
        evals += n;

        for (i, (trial, e)) in trials.into_iter().zip(trial_energies).enumerate() {
            if e < energies[i] {
                population[i] = trial;
                energies[i] = e;
            }
        }
        promote_lowest(&mut population, &mut energies);

        if spread_converged(&energies, config.tol, config.atol) {
            converged = true;
            break;
        }
    }

    let mut x = bounds.from_unit(&population[0]);
    let mut fval = energies[0];
    let mut polished = false;

    if let Some(polish) = &config.polish {
        let refined = nelder_mead(&objective, &x, bounds, polish);
        evals += refined.evals;
        if refined.fval < fval {
            x = refined.x;
            fval = refined.fval;
            polished = true;
        }
    }

    DifferentialEvolutionResult {
        x,
        fval,
        generations,
        evals,
        converged,
        polished,
    }
}

/// Stratified initial population: each axis is split into `n` equal strata,
/// one member per stratum, strata shuffled independently per axis.
fn latin_hypercube<const D: usize, R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<SVector<f64, D>> {
    let segment = 1.0 / n as f64;
    let samples: Vec<SVector<f64, D>> = (0..n)
        .map(|i| {
            let offset = i as f64 * segment;
            SVector::<f64, D>::from_fn(|_, _| segment * rng.gen_range(0.0..1.0) + offset)
        })
        .collect();

    let mut population = vec![SVector::<f64, D>::zeros(); n];
    let mut order: Vec<usize> = (0..n).collect();
    for j in 0..D {
        order.shuffle(rng);
        for (member, &src) in population.iter_mut().zip(&order) {
            member[j] = samples[src][j];
        }
    }
    population
}

/// `best + F·(r0 − r1)` with binomial crossover against the candidate.
fn best1bin<const D: usize, R: Rng + ?Sized>(
    population: &[SVector<f64, D>],
    candidate: usize,
    scale: f64,
    recombination: f64,
    rng: &mut R,
) -> SVector<f64, D> {
    let mut others: Vec<usize> = (0..population.len()).filter(|&i| i != candidate).collect();
    others.shuffle(rng);
    let (r0, r1) = (others[0], others[1]);

    let mutant = population[0] + scale * (population[r0] - population[r1]);

    let mut trial = population[candidate];
    let fill_point = rng.gen_range(0..D);
    for j in 0..D {
        let cross = rng.gen_range(0.0..1.0) < recombination;
        if cross || j == fill_point {
            trial[j] = mutant[j];
        }
    }
    trial
}

/// Redraw coordinates that left the unit cube.
fn ensure_in_unit_cube<const D: usize, R: Rng + ?Sized>(
    mut trial: SVector<f64, D>,
    rng: &mut R,
) -> SVector<f64, D> {
    for j in 0..D {
        if !(0.0..=1.0).contains(&trial[j]) {
            trial[j] = rng.gen_range(0.0..1.0);
        }
    }
    trial
}

/// Move the first lowest-energy member to index 0.
fn promote_lowest<const D: usize>(population: &mut [SVector<f64, D>], energies: &mut [f64]) {
    let mut best = 0;
    for (i, e) in energies.iter().enumerate().skip(1) {
        if *e < energies[best] {
            best = i;
        }
    }
    if best != 0 {
        population.swap(0, best);
        energies.swap(0, best);
    }
}

fn spread_converged(energies: &[f64], tol: f64, atol: f64) -> bool {
    let n = energies.len() as f64;
    let mean = energies.iter().sum::<f64>() / n;
    let var = energies.iter().map(|e| (e - mean).powi(2)).sum::<f64>() / n;
    // Infinite energies give a NaN spread, which never satisfies the test.
    var.sqrt() <= atol + tol * mean.abs()
}

#[cfg(test)]
mod tests {
    use nalgebra::{Vector2, Vector3};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn box3() -> SearchBox<3> {
        SearchBox::new(Vector3::new(-5.0, -5.0, -5.0), Vector3::new(5.0, 5.0, 5.0))
    }

    #[test]
    fn latin_hypercube_covers_every_stratum() {
        let mut rng = StdRng::seed_from_u64(1);
        let n = 12;
        let pop = latin_hypercube::<2, _>(n, &mut rng);
        for j in 0..2 {
            let mut strata: Vec<usize> = pop.iter().map(|p| (p[j] * n as f64).floor() as usize).collect();
            strata.sort_unstable();
            assert_eq!(strata, (0..n).collect::<Vec<_>>());
        }
    }

    #[test]
    fn finds_minimum_of_shifted_sphere() {
        let mut rng = StdRng::seed_from_u64(42);
        let target = Vector3::new(1.5, -2.0, 0.25);
        let result = differential_evolution(
            |p: &Vector3<f64>| (p - target).norm_squared(),
            &box3(),
            &mut rng,
            &DifferentialEvolutionConfig::default(),
        );
        assert!((result.x - target).amax() < 1e-3, "x = {:?}", result.x);
        assert!(result.fval < 1e-6);
    }

    #[test]
    fn prefers_deeper_of_two_wells() {
        // Wells at x = -3 (floor 1.0) and x = +3 (floor 0.0).
        let two_wells = |p: &Vector2<f64>| {
            let left = (p[0] + 3.0).powi(2) + 1.0;
            let right = (p[0] - 3.0).powi(2);
            left.min(right) + p[1] * p[1]
        };
        let bounds = SearchBox::new(Vector2::new(-5.0, -5.0), Vector2::new(5.0, 5.0));
        let mut rng = StdRng::seed_from_u64(3);
        let result = differential_evolution(two_wells, &bounds, &mut rng, &DifferentialEvolutionConfig::default());
        assert!((result.x[0] - 3.0).abs() < 1e-3, "x = {:?}", result.x);
        assert!(result.fval < 1e-6);
    }

    #[test]
    fn result_respects_bounds() {
        // Unconstrained minimum sits far outside the box.
        let mut rng = StdRng::seed_from_u64(9);
        let result = differential_evolution(
            |p: &Vector3<f64>| (p - Vector3::new(40.0, 0.0, 0.0)).norm_squared(),
            &box3(),
            &mut rng,
            &DifferentialEvolutionConfig::default(),
        );
        assert!(box3().contains(&result.x));
        assert!((result.x[0] - 5.0).abs() < 1e-3);
    }

    #[test]
    fn same_seed_same_result() {
        let objective = |p: &Vector3<f64>| (p[0] - 1.0).abs() + (p[1] * p[2]).sin().abs() + p[2] * p[2];
        let config = DifferentialEvolutionConfig {
            max_iter: 50,
            ..Default::default()
        };
        let a = differential_evolution(objective, &box3(), &mut StdRng::seed_from_u64(5), &config);
        let b = differential_evolution(objective, &box3(), &mut StdRng::seed_from_u64(5), &config);
        assert_eq!(a.x, b.x);
        assert_eq!(a.fval.to_bits(), b.fval.to_bits());
        assert_eq!(a.generations, b.generations);
    }

    #[test]
    fn generation_cap_is_reported() {
        let mut rng = StdRng::seed_from_u64(11);
        let config = DifferentialEvolutionConfig {
            max_iter: 2,
            polish: None,
            ..Default::default()
        };
        let result = differential_evolution(
            |p: &Vector3<f64>| p.norm_squared(),
            &box3(),
            &mut rng,
            &config,
        );
        assert_eq!(result.generations, 2);
        assert!(!result.converged);
        assert!(!result.polished);
        assert_eq!(result.evals, 45 * 3);
    }
}

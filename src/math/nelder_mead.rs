//! Bounded Nelder–Mead simplex minimizer.
//!
//! Derivative-free, so it works on the non-smooth nearest-sample loss. Bounds
//! are enforced by clamping every proposed vertex into the search box; the
//! initial simplex is reflected off the upper face before clamping so it never
//! collapses onto a boundary.

use nalgebra::SVector;

use crate::math::SearchBox;

/// Reflection coefficient.
const RHO: f64 = 1.0;
/// Expansion coefficient.
const CHI: f64 = 2.0;
/// Contraction coefficient.
const PSI: f64 = 0.5;
/// Shrink coefficient.
const SIGMA: f64 = 0.5;

/// Relative perturbation used to build the initial simplex.
const NONZERO_STEP: f64 = 0.05;
/// Absolute perturbation for coordinates that start at exactly zero.
const ZERO_STEP: f64 = 0.00025;

/// Configuration for the Nelder–Mead minimizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NelderMeadConfig {
    /// Maximum number of iterations.
    pub max_iter: usize,
    /// Maximum number of objective evaluations.
    pub max_evals: usize,
    /// Convergence threshold on vertex spread (absolute, per coordinate).
    pub xatol: f64,
    /// Convergence threshold on objective spread (absolute).
    pub fatol: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 10_000,
            max_evals: usize::MAX,
            xatol: 1e-6,
            fatol: 1e-6,
        }
    }
}

/// Best vertex found by a Nelder–Mead run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NelderMeadResult<const D: usize> {
    pub x: SVector<f64, D>,
    pub fval: f64,
    pub iterations: usize,
    pub evals: usize,
    /// `false` when the run stopped on an iteration or evaluation cap.
    pub converged: bool,
}

struct Counted<F> {
    objective: F,
    evals: usize,
}

impl<F> Counted<F> {
    fn call<const D: usize>(&mut self, x: &SVector<f64, D>) -> f64
    where
        F: Fn(&SVector<f64, D>) -> f64,
    {
        self.evals += 1;
        (self.objective)(x)
    }
}

/// Minimize `objective` inside `bounds`, starting from `x0`.
///
/// `x0` is clamped into the box first. Returns the best vertex even when the
/// run hits a cap; check `converged` to tell the cases apart.
pub fn nelder_mead<const D: usize, F>(
    objective: F,
    x0: &SVector<f64, D>,
    bounds: &SearchBox<D>,
    config: &NelderMeadConfig,
) -> NelderMeadResult<D>
where
    F: Fn(&SVector<f64, D>) -> f64,
{
    let mut f = Counted { objective, evals: 0 };
    let x0 = bounds.clip(x0);

    let mut verts: Vec<(SVector<f64, D>, f64)> = Vec::with_capacity(D + 1);
    let f0 = f.call(&x0);
    verts.push((x0, f0));
    for k in 0..D {
        let mut y = x0;
        if y[k] != 0.0 {
            y[k] *= 1.0 + NONZERO_STEP;
        } else {
            y[k] = ZERO_STEP;
        }
        let y = bounds.reflect_into(&y);
        let fy = f.call(&y);
        verts.push((y, fy));
    }
    sort_vertices(&mut verts);

    let worst = D;
    let mut iterations = 1;
    let mut converged = false;

    while f.evals < config.max_evals && iterations < config.max_iter {
        if has_converged(&verts, config) {
            converged = true;
            break;
        }

        let xbar = verts[..worst]
            .iter()
            .fold(SVector::<f64, D>::zeros(), |acc, (v, _)| acc + v)
            / D as f64;
        let x_worst = verts[worst].0;

        let xr = bounds.clip(&((1.0 + RHO) * xbar - RHO * x_worst));
        let fxr = f.call(&xr);

        if fxr < verts[0].1 {
            let xe = bounds.clip(&((1.0 + RHO * CHI) * xbar - RHO * CHI * x_worst));
            let fxe = f.call(&xe);
            verts[worst] = if fxe < fxr { (xe, fxe) } else { (xr, fxr) };
        } else if fxr < verts[worst - 1].1 {
            verts[worst] = (xr, fxr);
        } else {
            let mut shrink = false;
            if fxr < verts[worst].1 {
                // Outside contraction.
                let xc = bounds.clip(&((1.0 + PSI * RHO) * xbar - PSI * RHO * x_worst));
                let fxc = f.call(&xc);
                if fxc <= fxr {
                    verts[worst] = (xc, fxc);
                } else {
                    shrink = true;
                }
            } else {
                // Inside contraction.
                let xcc = bounds.clip(&((1.0 - PSI) * xbar + PSI * x_worst));
                let fxcc = f.call(&xcc);
                if fxcc < verts[worst].1 {
                    verts[worst] = (xcc, fxcc);
                } else {
                    shrink = true;
                }
            }

            if shrink {
                let best = verts[0].0;
                for vert in verts.iter_mut().skip(1) {
                    let p = bounds.clip(&(best + SIGMA * (vert.0 - best)));
                    *vert = (p, f.call(&p));
                }
            }
        }

        iterations += 1;
        sort_vertices(&mut verts);
    }

    NelderMeadResult {
        x: verts[0].0,
        fval: verts[0].1,
        iterations,
        evals: f.evals,
        converged,
    }
}

/// Stable ascending sort; NaN sorts last.
fn sort_vertices<const D: usize>(verts: &mut [(SVector<f64, D>, f64)]) {
    verts.sort_by(|a, b| a.1.total_cmp(&b.1));
}

fn has_converged<const D: usize>(verts: &[(SVector<f64, D>, f64)], config: &NelderMeadConfig) -> bool {
    let (best, f_best) = verts[0];
    let x_spread = verts[1..]
        .iter()
        .map(|(v, _)| (v - best).amax())
        .fold(0.0_f64, f64::max);
    let f_spread = verts[1..]
        .iter()
        .map(|(_, fv)| (f_best - fv).abs())
        .fold(0.0_f64, f64::max);
    x_spread <= config.xatol && f_spread <= config.fatol
}

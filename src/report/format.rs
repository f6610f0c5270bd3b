//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized

use crate::domain::FitConfig;
use crate::fit::{FitOutcome, StageRecord};
use crate::report::ResidualSummary;

/// Format the full run summary (inputs + fitted parameters + per-stage table).
pub fn format_run_summary(config: &FitConfig, outcome: &FitOutcome, residuals: Option<&ResidualSummary>) -> String {
    let r = &outcome.result;
    let d = &outcome.diagnostics;
    let mut out = String::new();

    out.push_str("=== xyfit - Parametric Curve Fit ===\n");
    out.push_str(&format!("Data: {}\n", config.data_path.display()));
    out.push_str(&format!(
        "Points: n={} | samples={} | restarts={} | seed={}\n",
        d.n_points,
        d.n_samples,
        d.restarts.len(),
        d.seed
    ));

    out.push_str("\nFitted parameters:\n");
    out.push_str(&format!("- theta = {:.6} deg ({:.6} rad)\n", r.theta_deg, r.theta_rad));
    out.push_str(&format!("- M     = {:.6}\n", r.m));
    out.push_str(&format!("- X     = {:.6}\n", r.x));
    out.push_str(&format!("- L1    = {:.6}\n", r.l1));
    if !d.within_bounds {
        out.push_str("! parameters fall outside the expected limits\n");
    }

    out.push_str("\nSearch stages:\n");
    out.push_str(&format_stage_table(outcome));

    if let Some(s) = residuals {
        out.push_str(&format!(
            "\nResiduals ({}): n={} mean={:.4} median={:.4} rms={:.4} max={:.4}\n",
            config.residual_mode.display_name(),
            s.n,
            s.mean,
            s.median,
            s.rms,
            s.max
        ));
    }

    out
}

/// One row per stage; the winner is marked with `*`.
pub fn format_stage_table(outcome: &FitOutcome) -> String {
    let d = &outcome.diagnostics;
    let mut out = String::new();
    out.push_str(
        format!(
            "  {:<12} {:>12} {:>10} {:>8} {:>10} {:>10} {:>10} {:<9}\n",
            "stage", "loss", "theta", "M", "X", "iters", "evals", "converged"
        )
        .trim_end(),
    );
    out.push('\n');

    for record in d.restarts.iter().chain(std::iter::once(&d.global)) {
        let chosen = if record.stage == d.winner { "*" } else { " " };
        out.push_str(format!("{chosen} {}", format_stage_row(record)).trim_end());
        out.push('\n');
    }
    out
}

fn format_stage_row(record: &StageRecord) -> String {
    format!(
        "{:<12} {:>12.6} {:>10.4} {:>8.5} {:>10.4} {:>10} {:>10} {:<9}",
        record.stage.label(),
        record.loss,
        record.params.theta_deg,
        record.params.m,
        record.params.x,
        record.iterations,
        record.evals,
        if record.converged { "yes" } else { "no" },
    )
}

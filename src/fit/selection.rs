//! Candidate selection across search stages.
//!
//! Candidates are offered in a fixed order (restart 0, 1, ..., then the
//! global pass). A candidate replaces the incumbent only when its loss is
//! strictly lower, so ties keep the earlier one and NaN never wins.

use serde::Serialize;

use crate::domain::CurveParams;

/// Which search stage produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Local restart with its zero-based index.
    Restart(usize),
    /// Differential evolution pass.
    Global,
}

impl Stage {
    pub fn label(self) -> String {
        match self {
            Stage::Restart(i) => format!("restart {}", i + 1),
            Stage::Global => "global".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub stage: Stage,
    pub params: CurveParams,
    pub loss: f64,
}

/// `true` when `candidate` should replace `incumbent`.
pub fn is_better(candidate: f64, incumbent: Option<f64>) -> bool {
    match incumbent {
        Some(best) => candidate < best,
        None => !candidate.is_nan(),
    }
}

/// Running best over candidates offered in order.
#[derive(Debug, Clone, Default)]
pub struct BestSoFar {
    best: Option<Candidate>,
}

impl BestSoFar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a candidate; returns `true` when it became the new best.
    pub fn offer(&mut self, candidate: Candidate) -> bool {
        if is_better(candidate.loss, self.best.map(|b| b.loss)) {
            self.best = Some(candidate);
            true
        } else {
            false
        }
    }

    pub fn into_best(self) -> Option<Candidate> {
        self.best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(stage: Stage, loss: f64) -> Candidate {
        Candidate {
            stage,
            params: CurveParams::default(),
            loss,
        }
    }

    fn reduce<const N: usize>(candidates: [Candidate; N]) -> Option<Candidate> {
        let mut best = BestSoFar::new();
        for c in candidates {
            best.offer(c);
        }
        best.into_best()
    }

    #[test]
    fn lowest_loss_wins() {
        let best = reduce([
            cand(Stage::Restart(0), 3.0),
            cand(Stage::Restart(1), 1.0),
            cand(Stage::Restart(2), 2.0),
        ])
        .unwrap();
        assert_eq!(best.stage, Stage::Restart(1));
    }

    #[test]
    fn ties_keep_the_earlier_candidate() {
        let best = reduce([
            cand(Stage::Restart(0), 2.0),
            cand(Stage::Restart(1), 1.0),
            cand(Stage::Restart(2), 1.0),
            cand(Stage::Global, 1.0),
        ])
        .unwrap();
        assert_eq!(best.stage, Stage::Restart(1));
    }

    #[test]
    fn nan_never_wins() {
        let best = reduce([cand(Stage::Restart(0), f64::NAN), cand(Stage::Global, 5.0)]).unwrap();
        assert_eq!(best.stage, Stage::Global);
        assert!(reduce([cand(Stage::Restart(0), f64::NAN)]).is_none());
        assert!(reduce([]).is_none());
    }

    #[test]
    fn offer_reports_improvements() {
        let mut best = BestSoFar::new();
        assert!(best.offer(cand(Stage::Restart(0), 4.0)));
        assert!(!best.offer(cand(Stage::Restart(1), 4.0)));
        assert!(best.offer(cand(Stage::Global, 3.5)));
        assert_eq!(best.into_best().map(|c| c.stage), Some(Stage::Global));
    }

    #[test]
    fn stage_labels_are_one_based() {
        assert_eq!(Stage::Restart(0).label(), "restart 1");
        assert_eq!(Stage::Global.label(), "global");
    }
}

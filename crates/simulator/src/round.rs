//! Lightweight per-round consensus evaluators (§4.7), distinct from the
//! full eight-mode family in `council-consensus` — these exist only to
//! decide whether a simulated/replayed round is decisive yet.

use council_core::{ConsensusMode, Vote};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    Approved,
    Rejected,
    Deadlock,
    Continue,
}

impl RoundOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundOutcome::Approved => "approved",
            RoundOutcome::Rejected => "rejected",
            RoundOutcome::Deadlock => "deadlock",
            RoundOutcome::Continue => "continue",
        }
    }
}

/// Which of the five round-evaluator families a full [`ConsensusMode`] maps
/// onto for simulation purposes. `ceo-veto` keeps its veto behavior; the
/// remaining lead-breaking modes (`ceo-override`, `hybrid-ceo-majority`,
/// `ranked-choice`) fall back to plain majority since the simulator has no
/// lead vote to consult mid-round.
fn family_for(mode: ConsensusMode) -> RoundEvaluator {
    match mode {
        ConsensusMode::Unanimous => RoundEvaluator::Unanimous,
        ConsensusMode::Supermajority => RoundEvaluator::Supermajority,
        ConsensusMode::Weighted => RoundEvaluator::Weighted,
        ConsensusMode::CeoVeto => RoundEvaluator::Veto,
        _ => RoundEvaluator::Majority,
    }
}

#[derive(Debug, Clone, Copy)]
enum RoundEvaluator {
    Majority,
    Unanimous,
    Supermajority,
    Weighted,
    Veto,
}

pub fn evaluate_round(votes: &[Vote], mode: ConsensusMode) -> RoundOutcome {
    match family_for(mode) {
        RoundEvaluator::Majority => majority(votes),
        RoundEvaluator::Unanimous => unanimous(votes),
        RoundEvaluator::Supermajority => supermajority(votes),
        RoundEvaluator::Weighted => weighted(votes),
        RoundEvaluator::Veto => veto(votes),
    }
}

fn tally(votes: &[Vote]) -> (usize, usize, usize) {
    let approvals = votes.iter().filter(|v| v.approved).count();
    let total = votes.len();
    (approvals, total - approvals, total)
}

fn majority(votes: &[Vote]) -> RoundOutcome {
    let (approvals, rejections, _) = tally(votes);
    if approvals > rejections {
        RoundOutcome::Approved
    } else if rejections > approvals {
        RoundOutcome::Rejected
    } else {
        RoundOutcome::Deadlock
    }
}

fn unanimous(votes: &[Vote]) -> RoundOutcome {
    let (approvals, _, total) = tally(votes);
    if approvals == total {
        RoundOutcome::Approved
    } else {
        RoundOutcome::Deadlock
    }
}

fn supermajority(votes: &[Vote]) -> RoundOutcome {
    let (approvals, _, total) = tally(votes);
    if total == 0 {
        return RoundOutcome::Deadlock;
    }
    let ratio = approvals as f64 / total as f64;
    if ratio >= 0.667 {
        RoundOutcome::Approved
    } else if ratio <= 0.333 {
        RoundOutcome::Rejected
    } else {
        RoundOutcome::Continue
    }
}

fn weighted(votes: &[Vote]) -> RoundOutcome {
    let approve_weight: f64 = votes.iter().filter(|v| v.approved).map(|v| v.weight).sum();
    let reject_weight: f64 = votes.iter().filter(|v| !v.approved).map(|v| v.weight).sum();
    let total = approve_weight + reject_weight;
    if total <= 0.0 {
        return RoundOutcome::Deadlock;
    }
    let ratio = approve_weight / total;
    if ratio > 0.6 {
        RoundOutcome::Approved
    } else if ratio < 0.4 {
        RoundOutcome::Rejected
    } else {
        RoundOutcome::Continue
    }
}

fn veto(votes: &[Vote]) -> RoundOutcome {
    if votes.iter().any(|v| !v.approved && v.confidence > 0.9) {
        return RoundOutcome::Rejected;
    }
    majority(votes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vote(approved: bool, confidence: f64) -> Vote {
        Vote { supervisor: "s".into(), approved, confidence, weight: 1.0, comment: String::new(), response_time_ms: 0 }
    }

    #[test]
    fn unanimous_deadlocks_on_any_dissent() {
        // §8 scenario 6
        let votes = vec![vote(true, 0.8), vote(true, 0.8), vote(false, 0.5)];
        assert_eq!(evaluate_round(&votes, ConsensusMode::Unanimous), RoundOutcome::Deadlock);
    }

    #[test]
    fn veto_overrides_majority_on_high_confidence_reject() {
        let votes = vec![vote(true, 0.8), vote(true, 0.8), vote(false, 0.95)];
        assert_eq!(evaluate_round(&votes, ConsensusMode::CeoVeto), RoundOutcome::Rejected);
    }

    #[test]
    fn majority_tie_is_a_deadlock() {
        let votes = vec![vote(true, 0.8), vote(false, 0.8)];
        assert_eq!(evaluate_round(&votes, ConsensusMode::SimpleMajority), RoundOutcome::Deadlock);
    }
}

use serde::{Deserialize, Serialize};

use crate::vote::Vote;

/// Outcome of a completed (or auto-approved) debate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub approved: bool,
    /// approvals / total, or 1.0 when `votes` is empty (§8).
    pub consensus: f64,
    /// `Σ(weight·confidence | approved) / Σ(weight)`, 0.0 when total weight is 0.
    pub weighted_consensus: f64,
    pub votes: Vec<Vote>,
    pub reasoning: String,
    /// Excerpts (≤300 chars) of every rejecting vote with confidence > 0.7.
    pub strong_dissent: Vec<String>,
}

impl Decision {
    /// Simple consensus per invariant (ii)/(iii) in spec §3.
    pub fn simple_consensus(votes: &[Vote]) -> f64 {
        if votes.is_empty() {
            return 1.0;
        }
        let approvals = votes.iter().filter(|v| v.approved).count();
        approvals as f64 / votes.len() as f64
    }

    /// Weighted consensus per GLOSSARY. Returns 0.0 when total weight is 0
    /// (vacuously — no supervisor carries any weight).
    pub fn weighted_consensus(votes: &[Vote]) -> f64 {
        let total_weight: f64 = votes.iter().map(|v| v.weight).sum();
        if total_weight <= 0.0 {
            return 0.0;
        }
        let approved_weighted: f64 = votes
            .iter()
            .filter(|v| v.approved)
            .map(|v| v.weight * v.confidence)
            .sum();
        approved_weighted / total_weight
    }

    pub fn strong_dissent(votes: &[Vote]) -> Vec<String> {
        votes
            .iter()
            .filter(|v| v.is_strong_dissent())
            .map(|v| v.excerpt())
            .collect()
    }

    /// Construct a `Decision`, deriving `consensus`/`weighted_consensus`/
    /// `strong_dissent` from `votes` automatically.
    pub fn from_votes(approved: bool, votes: Vec<Vote>, reasoning: String) -> Self {
        let consensus = Self::simple_consensus(&votes);
        let weighted_consensus = Self::weighted_consensus(&votes);
        let strong_dissent = Self::strong_dissent(&votes);
        Self {
            approved,
            consensus,
            weighted_consensus,
            votes,
            reasoning,
            strong_dissent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vote(name: &str, approved: bool, confidence: f64, weight: f64) -> Vote {
        Vote {
            supervisor: name.into(),
            approved,
            confidence,
            weight,
            comment: format!("{name} says so"),
            response_time_ms: 10,
        }
    }

    #[test]
    fn empty_votes_consensus_is_one() {
        assert_eq!(Decision::simple_consensus(&[]), 1.0);
        assert_eq!(Decision::weighted_consensus(&[]), 0.0);
    }

    #[test]
    fn scenario_three_supervisors_weighted() {
        // §8 scenario 1
        let votes = vec![
            vote("A", true, 0.9, 1.0),
            vote("B", true, 0.8, 1.0),
            vote("C", false, 0.5, 1.0),
        ];
        let simple = Decision::simple_consensus(&votes);
        let weighted = Decision::weighted_consensus(&votes);
        assert!((simple - 0.6667).abs() < 0.001);
        assert!((weighted - 0.5667).abs() < 0.001);
    }
}

//! C4 — Consensus Evaluator: eight tally rules over final votes, with
//! rationale (§4.4).

use council_core::{ConsensusMode, Decision, Vote};

/// Threshold + lead supervisor name that parameterize a handful of the
/// eight modes.
#[derive(Debug, Clone)]
pub struct ConsensusConfig {
    pub threshold: f64,
    pub lead: Option<String>,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self { threshold: 0.5, lead: None }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConsensusResult {
    pub approved: bool,
    pub reasoning: String,
}

/// Apply one of the eight consensus rules (§4.4 table) to `votes`.
pub fn evaluate(mode: ConsensusMode, votes: &[Vote], config: &ConsensusConfig) -> ConsensusResult {
    match mode {
        ConsensusMode::SimpleMajority => simple_majority(votes, config.threshold),
        ConsensusMode::Supermajority => supermajority(votes),
        ConsensusMode::Unanimous => unanimous(votes),
        ConsensusMode::Weighted => weighted(votes, config.threshold),
        ConsensusMode::CeoOverride => ceo_override(votes, config),
        ConsensusMode::CeoVeto => ceo_veto(votes, config),
        ConsensusMode::HybridCeoMajority => hybrid_ceo_majority(votes, config),
        ConsensusMode::RankedChoice => ranked_choice(votes),
    }
}

fn tally(votes: &[Vote]) -> (usize, usize) {
    let approvals = votes.iter().filter(|v| v.approved).count();
    (approvals, votes.len())
}

fn simple_majority(votes: &[Vote], threshold: f64) -> ConsensusResult {
    let (approvals, total) = tally(votes);
    let ratio = Decision::simple_consensus(votes);
    let approved = ratio >= threshold;
    ConsensusResult {
        approved,
        reasoning: format!(
            "Simple majority: {approvals}/{total} approved ({ratio:.2} >= threshold {threshold:.2})"
        ),
    }
}

fn supermajority(votes: &[Vote]) -> ConsensusResult {
    let (approvals, total) = tally(votes);
    let required = (total as f64 * 0.667).ceil() as usize;
    let approved = approvals >= required;
    ConsensusResult {
        approved,
        reasoning: format!(
            "Supermajority: {approvals}/{total} approved (required >= {required} of {total})"
        ),
    }
}

fn unanimous(votes: &[Vote]) -> ConsensusResult {
    let (approvals, total) = tally(votes);
    let approved = approvals == total;
    ConsensusResult {
        approved,
        reasoning: format!("Unanimous: {approvals}/{total} approved"),
    }
}

fn weighted(votes: &[Vote], threshold: f64) -> ConsensusResult {
    let weighted_consensus = Decision::weighted_consensus(votes);
    let approved = weighted_consensus >= threshold;
    ConsensusResult {
        approved,
        reasoning: format!(
            "Weighted consensus {weighted_consensus:.2} >= threshold {threshold:.2}"
        ),
    }
}

fn lead_vote<'a>(votes: &'a [Vote], lead: &Option<String>) -> Option<&'a Vote> {
    let lead = lead.as_ref()?;
    votes.iter().find(|v| &v.supervisor == lead)
}

fn ceo_override(votes: &[Vote], config: &ConsensusConfig) -> ConsensusResult {
    match lead_vote(votes, &config.lead) {
        Some(vote) => ConsensusResult {
            approved: vote.approved,
            reasoning: format!(
                "CEO Override: lead '{}' voted {}",
                vote.supervisor,
                if vote.approved { "APPROVE" } else { "REJECT" }
            ),
        },
        // §9 open question — missing lead vote falls through to weighted,
        // never silently to simple-majority.
        None => {
            let mut result = weighted(votes, config.threshold);
            result.reasoning = format!("No lead vote present — falling back to weighted. {}", result.reasoning);
            result
        }
    }
}

fn ceo_veto(votes: &[Vote], config: &ConsensusConfig) -> ConsensusResult {
    let (approvals, total) = tally(votes);
    let majority_approves = approvals * 2 > total;

    if let Some(lead) = lead_vote(votes, &config.lead) {
        if !lead.approved && lead.confidence >= 0.7 {
            return ConsensusResult {
                approved: false,
                reasoning: format!(
                    "CEO Veto: lead '{}' rejected with confidence {:.2}, overriding a {}/{} majority",
                    lead.supervisor, lead.confidence, approvals, total
                ),
            };
        }
    }

    ConsensusResult {
        approved: majority_approves,
        reasoning: format!("Majority decides: {approvals}/{total} approved, no veto triggered"),
    }
}

fn hybrid_ceo_majority(votes: &[Vote], config: &ConsensusConfig) -> ConsensusResult {
    let (approvals, total) = tally(votes);
    let rejections = total - approvals;
    let diff = approvals as i64 - rejections as i64;

    if diff.abs() > 1 {
        return ConsensusResult {
            approved: approvals > rejections,
            reasoning: format!("Clear majority: {approvals}/{total} approved vs {rejections} rejected"),
        };
    }

    if let Some(lead) = lead_vote(votes, &config.lead) {
        return ConsensusResult {
            approved: lead.approved,
            reasoning: format!(
                "Tie ({approvals} vs {rejections}) broken by lead '{}': {}",
                lead.supervisor,
                if lead.approved { "APPROVE" } else { "REJECT" }
            ),
        };
    }

    ConsensusResult {
        approved: true,
        reasoning: format!("Tie ({approvals} vs {rejections}) with no lead present — defaulting to approve"),
    }
}

fn ranked_choice(votes: &[Vote]) -> ConsensusResult {
    let approve_score: f64 = votes.iter().filter(|v| v.approved).map(|v| v.weight * v.confidence).sum();
    let reject_score: f64 = votes.iter().filter(|v| !v.approved).map(|v| v.weight * v.confidence).sum();
    let approved = approve_score >= reject_score;
    ConsensusResult {
        approved,
        reasoning: format!("Ranked choice: approve score {approve_score:.2} vs reject score {reject_score:.2}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vote(name: &str, approved: bool, confidence: f64, weight: f64) -> Vote {
        Vote { supervisor: name.into(), approved, confidence, weight, comment: String::new(), response_time_ms: 0 }
    }

    #[test]
    fn scenario_two_unanimous_rejects_on_one_dissent() {
        let votes = vec![
            vote("A", true, 0.6, 1.0),
            vote("B", true, 0.6, 1.0),
            vote("C", false, 0.6, 1.0),
        ];
        let result = evaluate(ConsensusMode::Unanimous, &votes, &ConsensusConfig::default());
        assert!(!result.approved);
        assert!(result.reasoning.contains("Unanimous"));
    }

    #[test]
    fn scenario_three_ceo_veto_overrides_majority() {
        let votes = vec![
            vote("GPT-4", true, 0.9, 1.0),
            vote("Claude", false, 0.95, 1.5),
            vote("Gemini", true, 0.8, 1.0),
        ];
        let config = ConsensusConfig { threshold: 0.5, lead: Some("Claude".to_string()) };
        let result = evaluate(ConsensusMode::CeoVeto, &votes, &config);
        assert!(!result.approved);
        assert!(result.reasoning.starts_with("CEO Veto:"));
    }

    #[test]
    fn ceo_override_falls_back_to_weighted_when_lead_absent() {
        let votes = vec![vote("A", true, 0.9, 1.0), vote("B", false, 0.9, 1.0)];
        let config = ConsensusConfig { threshold: 0.5, lead: Some("missing".to_string()) };
        let result = evaluate(ConsensusMode::CeoOverride, &votes, &config);
        // weighted consensus = 0.9/1.8 = 0.5 >= 0.5
        assert!(result.approved);
        assert!(result.reasoning.contains("falling back to weighted"));
    }

    #[test]
    fn hybrid_defaults_to_approve_on_tie_with_no_lead() {
        let votes = vec![vote("A", true, 0.9, 1.0), vote("B", false, 0.9, 1.0)];
        let result = evaluate(ConsensusMode::HybridCeoMajority, &votes, &ConsensusConfig::default());
        assert!(result.approved);
        assert!(result.reasoning.contains("defaulting to approve"));
    }

    #[test]
    fn supermajority_requires_two_thirds() {
        let votes = vec![
            vote("A", true, 0.9, 1.0),
            vote("B", true, 0.9, 1.0),
            vote("C", false, 0.9, 1.0),
        ];
        let result = evaluate(ConsensusMode::Supermajority, &votes, &ConsensusConfig::default());
        // ceil(3 * 0.667) = 3, so 2/3 approvals falls short.
        assert!(!result.approved);
    }

    #[test]
    fn ranked_choice_compares_weighted_scores() {
        let votes = vec![vote("A", true, 1.0, 1.0), vote("B", false, 0.4, 1.0)];
        let result = evaluate(ConsensusMode::RankedChoice, &votes, &ConsensusConfig::default());
        assert!(result.approved);
    }
}

use std::collections::HashMap;

use council_core::{ConsensusMode, Vote};
use rand::Rng;

use crate::round::{evaluate_round, RoundOutcome};
use crate::stored::StoredDebate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
    Approve,
    Reject,
    None,
}

impl Bias {
    fn approve_probability(self) -> f64 {
        match self {
            Bias::Approve => 0.6,
            Bias::Reject => 0.4,
            Bias::None => 0.5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulateParams {
    pub topic: String,
    pub context: String,
    pub mode: ConsensusMode,
    pub team: Vec<String>,
    pub max_rounds: u32,
    pub mock_responses: Option<HashMap<String, Vote>>,
    pub randomize: bool,
    pub bias_toward: Option<Bias>,
}

#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub debate: StoredDebate,
    pub outcome: RoundOutcome,
}

/// `simulate({...})` (§4.7) — no network I/O, synthesizes votes per round
/// from a caller mock or a random sample, stopping at the first round with
/// a non-`continue` outcome.
pub fn simulate(id: String, params: &SimulateParams) -> SimulationResult {
    let mut rounds = Vec::new();
    let mut outcome = RoundOutcome::Continue;
    let mut rng = rand::thread_rng();

    for _ in 0..params.max_rounds.max(1) {
        let votes: Vec<Vote> = params
            .team
            .iter()
            .map(|name| synthesize_vote(name, params, &mut rng))
            .collect();

        outcome = evaluate_round(&votes, params.mode);
        rounds.push(votes);
        if outcome != RoundOutcome::Continue {
            break;
        }
    }

    let debate = StoredDebate { id, team: params.team.clone(), mode: params.mode, rounds };
    SimulationResult { debate, outcome }
}

fn synthesize_vote(name: &str, params: &SimulateParams, rng: &mut impl Rng) -> Vote {
    if let Some(ref mocks) = params.mock_responses {
        if let Some(vote) = mocks.get(name) {
            return vote.clone();
        }
    }

    let approved = if params.randomize {
        let bias = params.bias_toward.unwrap_or(Bias::None);
        rng.gen_bool(bias.approve_probability())
    } else {
        true
    };

    Vote {
        supervisor: name.to_string(),
        approved,
        confidence: rng.gen_range(0.6..=1.0),
        weight: 1.0,
        comment: format!("simulated {} vote", if approved { "approve" } else { "reject" }),
        response_time_ms: rng.gen_range(500..=2500),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_randomized_simulation_always_approves() {
        let params = SimulateParams {
            topic: "topic".into(),
            context: "context".into(),
            mode: ConsensusMode::Unanimous,
            team: vec!["a".into(), "b".into()],
            max_rounds: 3,
            mock_responses: None,
            randomize: false,
            bias_toward: None,
        };
        let result = simulate("sim_1".into(), &params);
        assert_eq!(result.outcome, RoundOutcome::Approved);
        assert_eq!(result.debate.rounds.len(), 1);
    }

    #[test]
    fn mock_responses_are_used_verbatim() {
        let mut mocks = HashMap::new();
        mocks.insert(
            "a".to_string(),
            Vote { supervisor: "a".into(), approved: false, confidence: 0.95, weight: 1.0, comment: "no".into(), response_time_ms: 10 },
        );
        let params = SimulateParams {
            topic: "topic".into(),
            context: "context".into(),
            mode: ConsensusMode::CeoVeto,
            team: vec!["a".into()],
            max_rounds: 1,
            mock_responses: Some(mocks),
            randomize: false,
            bias_toward: None,
        };
        let result = simulate("sim_2".into(), &params);
        assert_eq!(result.outcome, RoundOutcome::Rejected);
    }
}

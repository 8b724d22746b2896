//! C7 — Debate Simulator: deterministic replay + what-if over stored
//! debates (§4.7). No network I/O — everything here is pure computation
//! over vote arrays, either pulled from history or synthesized.

mod replay;
mod round;
mod simulate;
mod stored;

use std::collections::HashMap;
use std::sync::Arc;

use council_core::{ids, ConsensusMode};
use council_history::HistoryStore;

pub use replay::{replay, ReplayConfig, ReplayResult, RoundComparison};
pub use round::{evaluate_round, RoundOutcome};
pub use simulate::{simulate, Bias, SimulateParams, SimulationResult};
pub use stored::StoredDebate;

/// Caller-facing bound on `findOptimalTeam` enumeration (§9 "Combinatorial
/// search ... caller-bounded ... total subsets scanned ≤ 2^16").
const MAX_SUBSETS_SCANNED: usize = 1 << 16;

pub struct Simulator {
    history: Option<Arc<HistoryStore>>,
}

impl Simulator {
    pub fn new(history: Option<Arc<HistoryStore>>) -> Self {
        Self { history }
    }

    /// Resolve a `storedDebateId` to a [`StoredDebate`], either from history
    /// (wrapped as a single round) or from a `simulate()` result the caller
    /// already holds.
    pub async fn get_stored(&self, id: &str) -> Option<StoredDebate> {
        let history = self.history.as_ref()?;
        let record = history.get(id).await?;
        Some(StoredDebate::from_record(&record))
    }

    pub fn simulate(&self, params: &SimulateParams) -> SimulationResult {
        simulate::simulate(ids::new_simulation_id(), params)
    }

    pub fn replay(&self, stored: &StoredDebate, config: &ReplayConfig) -> ReplayResult {
        replay::replay(stored, config)
    }

    /// `whatIf(storedId, [scenario...]) -> [{scenario, result}]` (§4.7) —
    /// runs replays in sequence.
    pub fn what_if(&self, stored: &StoredDebate, scenarios: &[ReplayConfig]) -> Vec<ReplayResult> {
        scenarios.iter().map(|scenario| replay::replay(stored, scenario)).collect()
    }

    /// `compareConsensusModes(storedId) -> {mode -> {outcome, roundsNeeded}}`
    /// (§4.7) — iterates all eight modes.
    pub fn compare_consensus_modes(&self, stored: &StoredDebate) -> HashMap<ConsensusMode, (RoundOutcome, usize)> {
        ConsensusMode::ALL
            .into_iter()
            .map(|mode| {
                let mut outcome = RoundOutcome::Continue;
                let mut rounds_needed = stored.rounds.len();
                for (idx, round) in stored.rounds.iter().enumerate() {
                    outcome = round::evaluate_round(round, mode);
                    if outcome != RoundOutcome::Continue {
                        rounds_needed = idx + 1;
                        break;
                    }
                }
                (mode, (outcome, rounds_needed))
            })
            .collect()
    }

    /// `findOptimalTeam(storedId, target, minSize)` (§4.7) — enumerates
    /// subsets of the original team (size ≥ `min_size`) over the final
    /// round's votes, returning the first subset achieving `target`.
    /// Caller-bounded: subsets beyond `minSize` are scanned up to 2^16;
    /// teams larger than 16 members are rejected outright.
    pub fn find_optimal_team(
        &self,
        stored: &StoredDebate,
        target: RoundOutcome,
        min_size: usize,
    ) -> Option<Vec<String>> {
        let Some(final_round) = stored.rounds.last() else { return None };
        let team = &stored.team;
        if team.len() > 16 {
            tracing::warn!(team_size = team.len(), "team too large for exhaustive subset search, skipping");
            return None;
        }

        let total_subsets = 1usize << team.len();
        for mask in 1..total_subsets.min(MAX_SUBSETS_SCANNED) {
            let subset: Vec<String> = team
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, name)| name.clone())
                .collect();
            if subset.len() < min_size {
                continue;
            }
            let subset_votes: Vec<_> = final_round.iter().filter(|v| subset.contains(&v.supervisor)).cloned().collect();
            if round::evaluate_round(&subset_votes, stored.mode) == target {
                return Some(subset);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_core::Vote;

    fn vote(name: &str, approved: bool, confidence: f64) -> Vote {
        Vote { supervisor: name.into(), approved, confidence, weight: 1.0, comment: String::new(), response_time_ms: 0 }
    }

    #[test]
    fn compare_consensus_modes_covers_all_eight() {
        let stored = StoredDebate {
            id: "debate_1".into(),
            team: vec!["a".into(), "b".into(), "c".into()],
            mode: ConsensusMode::SimpleMajority,
            rounds: vec![vec![vote("a", true, 0.9), vote("b", true, 0.9), vote("c", false, 0.9)]],
        };
        let sim = Simulator::new(None);
        let comparison = sim.compare_consensus_modes(&stored);
        assert_eq!(comparison.len(), 8);
        assert_eq!(comparison[&ConsensusMode::Unanimous].0, RoundOutcome::Deadlock);
    }

    #[test]
    fn find_optimal_team_locates_a_rejecting_subset() {
        let stored = StoredDebate {
            id: "debate_1".into(),
            team: vec!["a".into(), "b".into(), "c".into()],
            mode: ConsensusMode::SimpleMajority,
            rounds: vec![vec![vote("a", true, 0.9), vote("b", false, 0.9), vote("c", false, 0.9)]],
        };
        let sim = Simulator::new(None);
        let subset = sim.find_optimal_team(&stored, RoundOutcome::Rejected, 2);
        assert!(subset.is_some());
    }
}

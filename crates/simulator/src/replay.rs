use std::collections::HashMap;

use council_core::ConsensusMode;

use crate::round::{evaluate_round, RoundOutcome};
use crate::stored::StoredDebate;

#[derive(Debug, Clone, Default)]
pub struct ReplayConfig {
    pub consensus_mode: Option<ConsensusMode>,
    pub team_filter: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct RoundComparison {
    pub round: usize,
    pub original_votes: HashMap<String, bool>,
    pub replay_votes: HashMap<String, bool>,
    pub changed: bool,
}

#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub rounds: Vec<RoundComparison>,
    pub original_outcome: RoundOutcome,
    pub new_outcome: RoundOutcome,
    pub outcome_changed: bool,
    pub analysis: String,
}

/// `replay(storedDebateId, config)` (§4.7). Re-applies a consensus
/// evaluator — optionally a different mode and/or team filter — over the
/// stored per-round vote arrays, round by round, stopping at the first
/// round whose outcome is not `continue`. No network I/O.
pub fn replay(stored: &StoredDebate, config: &ReplayConfig) -> ReplayResult {
    let replay_mode = config.consensus_mode.unwrap_or(stored.mode);
    let team_filter = config.team_filter.as_deref();

    let original_rounds = stored.filtered_rounds(None);
    let replay_rounds = stored.filtered_rounds(team_filter);

    let original_outcome = run_until_decided(&original_rounds, stored.mode);
    let new_outcome = run_until_decided(&replay_rounds, replay_mode);

    let mut comparisons = Vec::new();
    for (idx, (orig, replay)) in original_rounds.iter().zip(replay_rounds.iter()).enumerate() {
        let original_votes: HashMap<String, bool> = orig.iter().map(|v| (v.supervisor.clone(), v.approved)).collect();
        let replay_votes: HashMap<String, bool> = replay.iter().map(|v| (v.supervisor.clone(), v.approved)).collect();
        let changed = original_votes != replay_votes;
        comparisons.push(RoundComparison { round: idx + 1, original_votes, replay_votes, changed });
    }

    let outcome_changed = original_outcome != new_outcome;
    let analysis = build_analysis(stored.mode, replay_mode, team_filter, outcome_changed, new_outcome);

    ReplayResult { rounds: comparisons, original_outcome, new_outcome, outcome_changed, analysis }
}

fn run_until_decided(rounds: &[Vec<council_core::Vote>], mode: ConsensusMode) -> RoundOutcome {
    let mut last = RoundOutcome::Continue;
    for round in rounds {
        let outcome = evaluate_round(round, mode);
        last = outcome;
        if outcome != RoundOutcome::Continue {
            return outcome;
        }
    }
    last
}

fn build_analysis(
    original_mode: ConsensusMode,
    replay_mode: ConsensusMode,
    team_filter: Option<&[String]>,
    outcome_changed: bool,
    new_outcome: RoundOutcome,
) -> String {
    let mut parts = Vec::new();
    if original_mode != replay_mode {
        parts.push(format!("consensus mode changed from {original_mode} to {replay_mode}"));
    }
    if let Some(team) = team_filter {
        parts.push(format!("team restricted to {}", team.join(", ")));
    }
    if parts.is_empty() {
        parts.push("no configuration changes from the original debate".to_string());
    }
    let verdict = if outcome_changed {
        format!("outcome changed to {}", new_outcome.as_str())
    } else {
        "outcome unchanged".to_string()
    };
    format!("{}; {verdict}", parts.join("; "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_core::{DebateMeta, Decision, Task, Vote, DebateRecord};
    use chrono::Utc;

    fn vote(name: &str, approved: bool) -> Vote {
        Vote { supervisor: name.into(), approved, confidence: 0.8, weight: 1.0, comment: String::new(), response_time_ms: 0 }
    }

    fn record_with_votes(votes: Vec<Vote>, mode: ConsensusMode) -> DebateRecord {
        let participating = votes.iter().map(|v| v.supervisor.clone()).collect();
        DebateRecord {
            id: "debate_1".into(),
            timestamp: Utc::now(),
            task: Task::new("t1", "task"),
            decision: Decision::from_votes(true, votes, "approved".into()),
            meta: DebateMeta {
                rounds_used: 1,
                consensus_mode: mode,
                lead_supervisor: None,
                dynamic_selection_summary: String::new(),
                duration_ms: 10,
                participating_supervisors: participating,
                session_id: None,
                task_type: None,
            },
        }
    }

    #[test]
    fn replay_with_unanimous_mode_change_flags_deadlock() {
        // §8 scenario 6
        let record = record_with_votes(
            vec![vote("a", true), vote("b", true), vote("c", false)],
            ConsensusMode::SimpleMajority,
        );
        let stored = StoredDebate::from_record(&record);
        let config = ReplayConfig { consensus_mode: Some(ConsensusMode::Unanimous), team_filter: None };
        let result = replay(&stored, &config);
        assert_eq!(result.new_outcome, RoundOutcome::Deadlock);
        assert!(result.outcome_changed);
        assert!(result.analysis.contains("unanimous"));
    }

    #[test]
    fn replay_with_no_changes_reports_same_outcome() {
        let record = record_with_votes(vec![vote("a", true), vote("b", true)], ConsensusMode::SimpleMajority);
        let stored = StoredDebate::from_record(&record);
        let result = replay(&stored, &ReplayConfig::default());
        assert!(!result.outcome_changed);
    }
}

use council_core::{ConsensusMode, DebateRecord, Vote};

/// A debate's per-round vote arrays, as the simulator sees it. A real
/// `DebateRecord` out of history has exactly one round — its final votes —
/// since the orchestrator only casts one true vote per supervisor. A
/// `simulate()`-produced debate may have several.
#[derive(Debug, Clone)]
pub struct StoredDebate {
    pub id: String,
    pub team: Vec<String>,
    pub mode: ConsensusMode,
    pub rounds: Vec<Vec<Vote>>,
}

impl StoredDebate {
    pub fn from_record(record: &DebateRecord) -> Self {
        Self {
            id: record.id.clone(),
            team: record.meta.participating_supervisors.clone(),
            mode: record.meta.consensus_mode,
            rounds: vec![record.decision.votes.clone()],
        }
    }

    /// Votes restricted to `team_filter`, preserving round order.
    pub fn filtered_rounds(&self, team_filter: Option<&[String]>) -> Vec<Vec<Vote>> {
        match team_filter {
            None => self.rounds.clone(),
            Some(team) => self
                .rounds
                .iter()
                .map(|round| round.iter().filter(|v| team.iter().any(|t| t == &v.supervisor)).cloned().collect())
                .collect(),
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::consensus_mode::ConsensusMode;
use crate::decision::Decision;
use crate::task::Task;

/// Metadata attached to a persisted debate, orthogonal to the `Decision` itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateMeta {
    pub rounds_used: u32,
    pub consensus_mode: ConsensusMode,
    pub lead_supervisor: Option<String>,
    pub dynamic_selection_summary: String,
    pub duration_ms: u64,
    pub participating_supervisors: Vec<String>,
    pub session_id: Option<String>,
    pub task_type: Option<String>,
}

/// An immutable, persisted record of one completed debate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub task: Task,
    pub decision: Decision,
    pub meta: DebateMeta,
}

impl DebateRecord {
    /// Invariant (iv): participating supervisors equal the votes' supervisors
    /// as a set.
    pub fn participants_match_votes(&self) -> bool {
        let mut from_meta = self.meta.participating_supervisors.clone();
        let mut from_votes: Vec<String> =
            self.decision.votes.iter().map(|v| v.supervisor.clone()).collect();
        from_meta.sort();
        from_votes.sort();
        from_meta == from_votes
    }
}

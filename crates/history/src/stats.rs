use std::collections::HashMap;

use chrono::{DateTime, Utc};
use council_core::DebateRecord;
use serde::{Deserialize, Serialize};

/// `stats() -> aggregates` (§4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryStats {
    pub total: usize,
    pub approved_count: usize,
    pub approval_rate: f64,
    pub avg_consensus: f64,
    pub avg_duration_ms: f64,
    pub by_task_type: HashMap<String, usize>,
    pub by_supervisor: HashMap<String, usize>,
    pub by_consensus_mode: HashMap<String, usize>,
    pub oldest: Option<DateTime<Utc>>,
    pub newest: Option<DateTime<Utc>>,
}

pub fn compute(records: &[DebateRecord]) -> HistoryStats {
    let total = records.len();
    if total == 0 {
        return HistoryStats {
            total: 0,
            approved_count: 0,
            approval_rate: 0.0,
            avg_consensus: 0.0,
            avg_duration_ms: 0.0,
            by_task_type: HashMap::new(),
            by_supervisor: HashMap::new(),
            by_consensus_mode: HashMap::new(),
            oldest: None,
            newest: None,
        };
    }

    let approved_count = records.iter().filter(|r| r.decision.approved).count();
    let avg_consensus = records.iter().map(|r| r.decision.consensus).sum::<f64>() / total as f64;
    let avg_duration_ms = records.iter().map(|r| r.meta.duration_ms as f64).sum::<f64>() / total as f64;

    let mut by_task_type = HashMap::new();
    let mut by_supervisor = HashMap::new();
    let mut by_consensus_mode = HashMap::new();

    for record in records {
        if let Some(ref task_type) = record.meta.task_type {
            *by_task_type.entry(task_type.clone()).or_insert(0) += 1;
        }
        for vote in &record.decision.votes {
            *by_supervisor.entry(vote.supervisor.clone()).or_insert(0) += 1;
        }
        *by_consensus_mode.entry(record.meta.consensus_mode.to_string()).or_insert(0) += 1;
    }

    let oldest = records.iter().map(|r| r.timestamp).min();
    let newest = records.iter().map(|r| r.timestamp).max();

    HistoryStats {
        total,
        approved_count,
        approval_rate: approved_count as f64 / total as f64,
        avg_consensus,
        avg_duration_ms,
        by_task_type,
        by_supervisor,
        by_consensus_mode,
        oldest,
        newest,
    }
}

/// `supervisorHistory(name)` (§4.6) — every record `name` participated in.
pub fn supervisor_history(records: &[DebateRecord], name: &str) -> Vec<DebateRecord> {
    records
        .iter()
        .filter(|r| r.decision.votes.iter().any(|v| v.supervisor == name))
        .cloned()
        .collect()
}

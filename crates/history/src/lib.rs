//! C6 — Debate History: a persisted query/statistics store over completed
//! debates (§4.6). Write-only append surface plus a read surface; retention
//! pruning runs on every save and can also be triggered explicitly.

mod export;
mod filters;
mod log;
mod stats;

use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use council_core::{Decision, DebateMeta, DebateRecord, Task, ids};
use tokio::sync::RwLock;

pub use export::{to_csv, to_json, CSV_HEADER};
pub use filters::{QueryFilters, SortField, SortOrder};
pub use log::DebateLog;
pub use stats::{compute, supervisor_history, HistoryStats};

#[derive(Debug, Clone, Copy)]
pub enum ExportFormat {
    Json,
    Csv,
}

/// Retention policy applied on every `save` (§4.6).
#[derive(Debug, Clone, Copy)]
pub struct RetentionPolicy {
    pub retention_days: Option<i64>,
    pub max_records: Option<usize>,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self { retention_days: None, max_records: None }
    }
}

pub struct HistoryStore {
    records: RwLock<Vec<DebateRecord>>,
    log: Option<DebateLog>,
    retention: RetentionPolicy,
}

impl HistoryStore {
    /// In-memory only — no durable backing file.
    pub fn in_memory(retention: RetentionPolicy) -> Self {
        Self { records: RwLock::new(Vec::new()), log: None, retention }
    }

    /// Backed by a JSONL file; existing records are loaded immediately.
    pub fn open(path: impl Into<PathBuf>, retention: RetentionPolicy) -> Result<Self> {
        let log = DebateLog::new(path);
        let records = log.load()?;
        Ok(Self { records: RwLock::new(records), log: Some(log), retention })
    }

    /// `save(task, decision, meta) -> record` (§4.6).
    pub async fn save(&self, task: Task, decision: Decision, mut meta: DebateMeta) -> Result<DebateRecord> {
        if meta.participating_supervisors.is_empty() {
            meta.participating_supervisors = decision.votes.iter().map(|v| v.supervisor.clone()).collect();
        }

        let record = DebateRecord { id: ids::new_debate_id(), timestamp: Utc::now(), task, decision, meta };

        if let Some(ref log) = self.log {
            log.append(&record).await?;
        }

        let mut records = self.records.write().await;
        records.push(record.clone());
        drop(records);

        self.prune().await?;
        Ok(record)
    }

    pub async fn get(&self, id: &str) -> Option<DebateRecord> {
        self.records.read().await.iter().find(|r| r.id == id).cloned()
    }

    pub async fn query(&self, filters: &QueryFilters) -> Vec<DebateRecord> {
        let records = self.records.read().await;
        filters::apply(&records, filters)
    }

    pub async fn stats(&self) -> HistoryStats {
        let records = self.records.read().await;
        stats::compute(&records)
    }

    pub async fn supervisor_history(&self, name: &str) -> Vec<DebateRecord> {
        let records = self.records.read().await;
        stats::supervisor_history(&records, name)
    }

    pub async fn export(&self, format: ExportFormat) -> Result<String> {
        let records = self.records.read().await;
        match format {
            ExportFormat::Json => export::to_json(&records),
            ExportFormat::Csv => Ok(export::to_csv(&records)),
        }
    }

    /// `clearAll() -> count` (§4.6).
    pub async fn clear_all(&self) -> Result<usize> {
        let mut records = self.records.write().await;
        let count = records.len();
        records.clear();
        if let Some(ref log) = self.log {
            log.overwrite(&[]).await?;
        }
        Ok(count)
    }

    /// Prune records older than `retentionDays` and anything above
    /// `maxRecords` (oldest-first), per §4.6.
    pub async fn prune(&self) -> Result<usize> {
        let mut records = self.records.write().await;
        let before = records.len();

        if let Some(days) = self.retention.retention_days {
            let cutoff = Utc::now() - chrono::Duration::days(days);
            records.retain(|r| r.timestamp >= cutoff);
        }

        if let Some(max) = self.retention.max_records {
            if records.len() > max {
                records.sort_by_key(|r| r.timestamp);
                let overflow = records.len() - max;
                records.drain(0..overflow);
            }
        }

        let pruned = before - records.len();
        if pruned > 0 {
            if let Some(ref log) = self.log {
                log.overwrite(&records).await?;
            }
        }
        Ok(pruned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_core::{ConsensusMode, Vote};

    fn meta() -> DebateMeta {
        DebateMeta {
            rounds_used: 2,
            consensus_mode: ConsensusMode::Weighted,
            lead_supervisor: None,
            dynamic_selection_summary: "test".into(),
            duration_ms: 500,
            participating_supervisors: vec![],
            session_id: Some("s1".into()),
            task_type: Some("bug-fix".into()),
        }
    }

    fn decision() -> Decision {
        Decision::from_votes(
            true,
            vec![Vote { supervisor: "gpt-4".into(), approved: true, confidence: 0.9, weight: 1.0, comment: "ok".into(), response_time_ms: 10 }],
            "approved".into(),
        )
    }

    #[tokio::test]
    async fn save_then_get_round_trips() {
        let store = HistoryStore::in_memory(RetentionPolicy::default());
        let saved = store.save(Task::new("t1", "fix bug"), decision(), meta()).await.unwrap();
        let fetched = store.get(&saved.id).await.unwrap();
        assert_eq!(fetched.id, saved.id);
        assert!(fetched.participants_match_votes());
    }

    #[tokio::test]
    async fn max_records_prunes_oldest_first() {
        let store = HistoryStore::in_memory(RetentionPolicy { retention_days: None, max_records: Some(2) });
        for i in 0..5 {
            store.save(Task::new(format!("t{i}"), "task"), decision(), meta()).await.unwrap();
        }
        let stats = store.stats().await;
        assert_eq!(stats.total, 2);
    }

    #[tokio::test]
    async fn query_filters_by_approved() {
        let store = HistoryStore::in_memory(RetentionPolicy::default());
        store.save(Task::new("t1", "a"), decision(), meta()).await.unwrap();
        let mut rejected_meta = meta();
        rejected_meta.session_id = Some("s2".into());
        let rejected = Decision::from_votes(false, vec![], "rejected".into());
        store.save(Task::new("t2", "b"), rejected, rejected_meta).await.unwrap();

        let filters = QueryFilters { approved: Some(false), ..Default::default() };
        let results = store.query(&filters).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].task.id, "t2");
    }

    #[tokio::test]
    async fn clear_all_returns_count_and_empties_store() {
        let store = HistoryStore::in_memory(RetentionPolicy::default());
        store.save(Task::new("t1", "a"), decision(), meta()).await.unwrap();
        store.save(Task::new("t2", "b"), decision(), meta()).await.unwrap();
        let count = store.clear_all().await.unwrap();
        assert_eq!(count, 2);
        assert_eq!(store.stats().await.total, 0);
    }

    #[tokio::test]
    async fn export_csv_has_fixed_header() {
        let store = HistoryStore::in_memory(RetentionPolicy::default());
        store.save(Task::new("t1", "a"), decision(), meta()).await.unwrap();
        let csv = store.export(ExportFormat::Csv).await.unwrap();
        assert!(csv.starts_with(CSV_HEADER));
    }
}

//! C9 — Log Rotation: bounded per-session ring with age+count pruning
//! (§4.9).

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy)]
pub struct RotationConfig {
    pub max_logs_per_session: usize,
    pub max_log_age_ms: i64,
    pub prune_interval_ms: u64,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self { max_logs_per_session: 1000, max_log_age_ms: 24 * 60 * 60 * 1000, prune_interval_ms: 60_000 }
    }
}

pub struct PagedLogs {
    pub logs: Vec<LogEntry>,
    pub total: usize,
    pub has_more: bool,
}

/// Eager-soft-trim ring log, one ring per session (§4.9).
pub struct LogRotation {
    config: RotationConfig,
    sessions: RwLock<HashMap<String, VecDeque<LogEntry>>>,
}

impl LogRotation {
    pub fn new(config: RotationConfig) -> Self {
        Self { config, sessions: RwLock::new(HashMap::new()) }
    }

    /// Append a log line; if the session's ring now exceeds
    /// `maxLogsPerSession * 1.2`, prune that session immediately (the
    /// "eager soft trim" — otherwise pruning waits for the timer).
    pub async fn append(&self, session_id: &str, level: impl Into<String>, message: impl Into<String>) {
        let entry = LogEntry { timestamp: Utc::now(), level: level.into(), message: message.into() };
        let soft_limit = (self.config.max_logs_per_session as f64 * 1.2) as usize;

        let mut sessions = self.sessions.write().await;
        let ring = sessions.entry(session_id.to_string()).or_default();
        ring.push_back(entry);
        let over_soft_limit = ring.len() > soft_limit;
        drop(sessions);

        if over_soft_limit {
            self.prune_session(session_id).await;
        }
    }

    /// Drop entries older than `maxLogAgeMs`, then if still over
    /// `maxLogsPerSession`, drop the oldest surplus from the front (§4.9).
    async fn prune_session(&self, session_id: &str) {
        let mut sessions = self.sessions.write().await;
        let Some(ring) = sessions.get_mut(session_id) else { return };
        let cutoff = Utc::now() - chrono::Duration::milliseconds(self.config.max_log_age_ms);
        ring.retain(|entry| entry.timestamp >= cutoff);

        if ring.len() > self.config.max_logs_per_session {
            let overflow = ring.len() - self.config.max_logs_per_session;
            ring.drain(0..overflow);
        }
    }

    /// Prune every registered session; called on the `pruneIntervalMs`
    /// timer.
    pub async fn prune_all(&self) {
        let ids: Vec<String> = self.sessions.read().await.keys().cloned().collect();
        for id in ids {
            self.prune_session(&id).await;
        }
    }

    pub async fn remove_session(&self, session_id: &str) {
        self.sessions.write().await.remove(session_id);
    }

    /// `getWithPagination(offset, limit) -> {logs, total, hasMore}` (§4.9).
    pub async fn get_with_pagination(&self, session_id: &str, offset: usize, limit: usize) -> PagedLogs {
        let sessions = self.sessions.read().await;
        let ring = sessions.get(session_id);
        let total = ring.map(|r| r.len()).unwrap_or(0);

        let logs = ring
            .map(|r| r.iter().skip(offset).take(limit).cloned().collect())
            .unwrap_or_default();
        let has_more = offset + limit < total;

        PagedLogs { logs, total, has_more }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RotationConfig {
        RotationConfig { max_logs_per_session: 5, max_log_age_ms: 60_000, prune_interval_ms: 1000 }
    }

    #[tokio::test]
    async fn eager_soft_trim_fires_past_1_2x_limit() {
        let rotation = LogRotation::new(config());
        for i in 0..6 {
            rotation.append("s1", "info", format!("line {i}")).await;
        }
        let page = rotation.get_with_pagination("s1", 0, 100).await;
        assert_eq!(page.total, 6);

        rotation.append("s1", "info", "line 6").await;
        let page = rotation.get_with_pagination("s1", 0, 100).await;
        assert_eq!(page.total, 5);
    }

    #[tokio::test]
    async fn pagination_reports_has_more() {
        let rotation = LogRotation::new(RotationConfig { max_logs_per_session: 100, ..config() });
        for i in 0..10 {
            rotation.append("s1", "info", format!("line {i}")).await;
        }
        let page = rotation.get_with_pagination("s1", 0, 4).await;
        assert_eq!(page.logs.len(), 4);
        assert_eq!(page.total, 10);
        assert!(page.has_more);

        let last_page = rotation.get_with_pagination("s1", 8, 4).await;
        assert_eq!(last_page.logs.len(), 2);
        assert!(!last_page.has_more);
    }

    #[tokio::test]
    async fn prune_all_drops_aged_out_entries() {
        let rotation = LogRotation::new(RotationConfig { max_log_age_ms: -1, ..config() });
        rotation.append("s1", "info", "stale").await;
        rotation.prune_all().await;
        let page = rotation.get_with_pagination("s1", 0, 100).await;
        assert_eq!(page.total, 0);
    }
}

//! C10 — Session Persistence: an at-most-once durable snapshot of session
//! descriptors (§4.10).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Starting,
    Running,
    Paused,
    Stopped,
    Completed,
    Failed,
}

impl SessionStatus {
    /// Sessions resumable on startup are {running, paused, starting} (§4.10).
    pub fn is_resumable(&self) -> bool {
        matches!(self, SessionStatus::Running | SessionStatus::Paused | SessionStatus::Starting)
    }

    fn is_running(&self) -> bool {
        matches!(self, SessionStatus::Running)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDescriptor {
    pub id: String,
    pub label: String,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionDescriptor {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        let now = Utc::now();
        Self { id: id.into(), label: label.into(), status: SessionStatus::Starting, created_at: now, updated_at: now }
    }
}

const DOCUMENT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDocument {
    pub version: u32,
    pub updated_at: DateTime<Utc>,
    pub sessions: Vec<SessionDescriptor>,
}

impl Default for SessionDocument {
    fn default() -> Self {
        Self { version: DOCUMENT_VERSION, updated_at: Utc::now(), sessions: Vec::new() }
    }
}

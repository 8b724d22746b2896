use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unresponsive,
    Crashed,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Unresponsive => "unresponsive",
            HealthStatus::Crashed => "crashed",
        }
    }

    /// `crashed` is terminal (§3 invariant vi).
    pub fn is_terminal(&self) -> bool {
        matches!(self, HealthStatus::Crashed)
    }
}

/// Per-session health record (§3 "SessionHealth").
#[derive(Debug, Clone)]
pub struct SessionHealth {
    pub status: HealthStatus,
    pub last_check: DateTime<Utc>,
    pub consecutive_failures: u32,
    pub restart_count: u32,
    pub last_restart: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl SessionHealth {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            status: HealthStatus::Healthy,
            last_check: now,
            consecutive_failures: 0,
            restart_count: 0,
            last_restart: None,
            last_error: None,
        }
    }
}

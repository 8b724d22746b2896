use std::collections::VecDeque;

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One completed call, retained only for success-rate/latency statistics
/// and trimmed to `retention_hours` (§3 "rolling request history").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestRecord {
    pub at: DateTime<Utc>,
    pub tokens: u64,
    pub latency_ms: u64,
    pub success: bool,
}

/// Per-provider sliding-window usage counters (§3 "ProviderUsage (Quota)").
///
/// Windows are time-based scalar counters rather than per-request queues —
/// cheaper and sufficient given rpm/rph scales (§9).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderUsage {
    pub minute_window_start: DateTime<Utc>,
    pub requests_this_minute: u32,
    pub tokens_this_minute: u64,

    pub hour_window_start: DateTime<Utc>,
    pub requests_this_hour: u32,
    pub tokens_this_hour: u64,

    /// Local civil day this usage's `cost_today`/`tokens_today` belong to.
    pub day_date: NaiveDate,
    pub tokens_today: u64,
    pub cost_today: f64,

    /// Not windowed — tracks true in-flight calls.
    pub concurrent_in_flight: u32,

    pub request_history: VecDeque<RequestRecord>,
    pub retention_hours: i64,

    pub throttled: bool,
    pub throttle_end: Option<DateTime<Utc>>,
}

impl ProviderUsage {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            minute_window_start: now,
            requests_this_minute: 0,
            tokens_this_minute: 0,
            hour_window_start: now,
            requests_this_hour: 0,
            tokens_this_hour: 0,
            day_date: now.with_timezone(&Local).date_naive(),
            tokens_today: 0,
            cost_today: 0.0,
            concurrent_in_flight: 0,
            request_history: VecDeque::new(),
            retention_hours: 24,
            throttled: false,
            throttle_end: None,
        }
    }

    /// Slide each window forward when `now` has crossed its boundary
    /// (§4.2 "On any accessor..."). Must run before every accessor so
    /// `check`/`start`/`record` never observe a stale window.
    pub fn roll_windows(&mut self, now: DateTime<Utc>) {
        if (now - self.minute_window_start).num_milliseconds() >= 60_000 {
            self.minute_window_start = now;
            self.requests_this_minute = 0;
            self.tokens_this_minute = 0;
        }
        if (now - self.hour_window_start).num_milliseconds() >= 3_600_000 {
            self.hour_window_start = now;
            self.requests_this_hour = 0;
            self.tokens_this_hour = 0;
        }
        let local_today = now.with_timezone(&Local).date_naive();
        if local_today != self.day_date {
            self.day_date = local_today;
            self.tokens_today = 0;
            self.cost_today = 0.0;
        }
        self.trim_history(now);
    }

    fn trim_history(&mut self, now: DateTime<Utc>) {
        let cutoff = now - chrono::Duration::hours(self.retention_hours);
        while let Some(front) = self.request_history.front() {
            if front.at < cutoff {
                self.request_history.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn record_request(&mut self, now: DateTime<Utc>, tokens: u64, latency_ms: u64, success: bool) {
        self.roll_windows(now);
        self.requests_this_minute += 1;
        self.requests_this_hour += 1;
        self.tokens_this_minute += tokens;
        self.tokens_this_hour += tokens;
        self.tokens_today += tokens;
        self.request_history.push_back(RequestRecord { at: now, tokens, latency_ms, success });
    }

    pub fn success_rate(&self) -> f64 {
        if self.request_history.is_empty() {
            return 1.0;
        }
        let successes = self.request_history.iter().filter(|r| r.success).count();
        successes as f64 / self.request_history.len() as f64
    }
}

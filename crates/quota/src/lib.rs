//! C2 — Quota Manager: sliding-window rate/token/cost gating and throttling.
//!
//! `check` is first-match-wins across eight conditions (§4.2). Counters are
//! updated under a per-provider `tokio::sync::Mutex` so `check`+`start`+
//! `record` never race a window rollover (§5).

mod events;
mod limits;
mod usage;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{debug, info, warn};

pub use events::QuotaEvent;
pub use limits::ProviderLimits;
pub use usage::{ProviderUsage, RequestRecord};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Result of [`QuotaManager::check`].
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub allowed: bool,
    pub reason: Option<String>,
    pub wait_ms: Option<u64>,
    pub snapshot: ProviderUsage,
}

struct ProviderState {
    usage: Mutex<ProviderUsage>,
    limits: RwLock<ProviderLimits>,
}

pub struct QuotaManager {
    enabled: RwLock<bool>,
    providers: RwLock<HashMap<String, Arc<ProviderState>>>,
    global_daily_budget: RwLock<Option<f64>>,
    global_cost_today: Mutex<(chrono::NaiveDate, f64)>,
    alert_threshold: f64,
    events: broadcast::Sender<QuotaEvent>,
}

impl Default for QuotaManager {
    fn default() -> Self {
        Self::new(0.8)
    }
}

impl QuotaManager {
    pub fn new(alert_threshold: f64) -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            enabled: RwLock::new(true),
            providers: RwLock::new(HashMap::new()),
            global_daily_budget: RwLock::new(None),
            global_cost_today: Mutex::new((Local::now().date_naive(), 0.0)),
            alert_threshold,
            events: tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<QuotaEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: QuotaEvent) {
        let _ = self.events.send(event);
    }

    pub async fn set_enabled(&self, enabled: bool) {
        *self.enabled.write().await = enabled;
    }

    pub async fn is_enabled(&self) -> bool {
        *self.enabled.read().await
    }

    pub async fn set_global_daily_budget(&self, budget: Option<f64>) {
        *self.global_daily_budget.write().await = budget;
    }

    pub async fn set_limits(&self, provider: &str, limits: ProviderLimits) {
        let state = self.provider_state(provider).await;
        *state.limits.write().await = limits;
        self.emit(QuotaEvent::ConfigChanged { provider: provider.to_string() });
    }

    async fn provider_state(&self, provider: &str) -> Arc<ProviderState> {
        if let Some(state) = self.providers.read().await.get(provider) {
            return state.clone();
        }
        let mut providers = self.providers.write().await;
        providers
            .entry(provider.to_string())
            .or_insert_with(|| {
                Arc::new(ProviderState {
                    usage: Mutex::new(ProviderUsage::new(Utc::now())),
                    limits: RwLock::new(ProviderLimits::for_provider(provider)),
                })
            })
            .clone()
    }

    /// §4.2 check ordering — first match wins.
    pub async fn check(&self, provider: &str) -> CheckResult {
        let now = Utc::now();

        if !self.is_enabled().await {
            let state = self.provider_state(provider).await;
            let mut usage = state.usage.lock().await;
            usage.roll_windows(now);
            return CheckResult { allowed: true, reason: None, wait_ms: None, snapshot: usage.clone() };
        }

        let state = self.provider_state(provider).await;
        let limits = state.limits.read().await.clone();
        let mut usage = state.usage.lock().await;
        usage.roll_windows(now);

        // 2. throttle
        if usage.throttled {
            match usage.throttle_end {
                Some(end) if now < end => {
                    let wait_ms = (end - now).num_milliseconds().max(0) as u64;
                    return CheckResult {
                        allowed: false,
                        reason: Some("provider is throttled".to_string()),
                        wait_ms: Some(wait_ms),
                        snapshot: usage.clone(),
                    };
                }
                _ => {
                    usage.throttled = false;
                    usage.throttle_end = None;
                    self.emit(QuotaEvent::Unthrottled { provider: provider.to_string() });
                }
            }
        }

        // 3. concurrency
        if usage.concurrent_in_flight >= limits.max_concurrent {
            return CheckResult {
                allowed: false,
                reason: Some("max concurrent requests reached".to_string()),
                wait_ms: Some(1_000),
                snapshot: usage.clone(),
            };
        }

        // 4. requests per minute
        if usage.requests_this_minute >= limits.requests_per_minute {
            let elapsed = (now - usage.minute_window_start).num_milliseconds().max(0);
            let wait_ms = (60_000 - elapsed).max(0) as u64;
            return CheckResult {
                allowed: false,
                reason: Some("requests per minute limit reached".to_string()),
                wait_ms: Some(wait_ms),
                snapshot: usage.clone(),
            };
        }

        // 5. requests per hour
        if usage.requests_this_hour >= limits.requests_per_hour {
            let elapsed = (now - usage.hour_window_start).num_milliseconds().max(0);
            let wait_ms = (3_600_000 - elapsed).max(0) as u64;
            return CheckResult {
                allowed: false,
                reason: Some("requests per hour limit reached".to_string()),
                wait_ms: Some(wait_ms),
                snapshot: usage.clone(),
            };
        }

        // 6. tokens per minute / tokens per day
        if let Some(tpm) = limits.tokens_per_minute {
            if usage.tokens_this_minute >= tpm {
                let elapsed = (now - usage.minute_window_start).num_milliseconds().max(0);
                let wait_ms = (60_000 - elapsed).max(0) as u64;
                return CheckResult {
                    allowed: false,
                    reason: Some("tokens per minute limit reached".to_string()),
                    wait_ms: Some(wait_ms),
                    snapshot: usage.clone(),
                };
            }
        }
        if let Some(tpd) = limits.tokens_per_day {
            if usage.tokens_today >= tpd {
                return CheckResult {
                    allowed: false,
                    reason: Some("tokens per day limit reached".to_string()),
                    wait_ms: Some(ms_until_next_local_day(now)),
                    snapshot: usage.clone(),
                };
            }
        }

        // 7. global daily cost budget
        if let Some(budget) = *self.global_daily_budget.read().await {
            let mut global = self.global_cost_today.lock().await;
            let today = now.with_timezone(&Local).date_naive();
            if global.0 != today {
                *global = (today, 0.0);
            }
            if global.1 >= budget {
                return CheckResult {
                    allowed: false,
                    reason: Some("global daily cost budget exhausted".to_string()),
                    wait_ms: Some(ms_until_next_local_day(now)),
                    snapshot: usage.clone(),
                };
            }
        }

        // 8. allow; alert on high utilization
        self.maybe_alert(provider, &usage, &limits);
        CheckResult { allowed: true, reason: None, wait_ms: None, snapshot: usage.clone() }
    }

    fn maybe_alert(&self, provider: &str, usage: &ProviderUsage, limits: &ProviderLimits) {
        let rpm_util = usage.requests_this_minute as f64 / limits.requests_per_minute.max(1) as f64;
        let rph_util = usage.requests_this_hour as f64 / limits.requests_per_hour.max(1) as f64;
        let concurrency_util = usage.concurrent_in_flight as f64 / limits.max_concurrent.max(1) as f64;
        for (dimension, util) in [
            ("requests_per_minute", rpm_util),
            ("requests_per_hour", rph_util),
            ("concurrency", concurrency_util),
        ] {
            if util >= self.alert_threshold {
                debug!(provider, dimension, util, "quota utilization crossed alert threshold");
                self.emit(QuotaEvent::Alert {
                    provider: provider.to_string(),
                    utilization: util,
                    dimension: dimension.to_string(),
                });
            }
        }
    }

    /// Reserve a concurrency slot. Pair with [`Self::finish`] once the call
    /// settles (success or failure) so `concurrent_in_flight` never leaks.
    pub async fn start(&self, provider: &str) {
        let state = self.provider_state(provider).await;
        let mut usage = state.usage.lock().await;
        usage.concurrent_in_flight += 1;
    }

    /// Release the concurrency slot reserved by [`Self::start`].
    pub async fn finish(&self, provider: &str) {
        let state = self.provider_state(provider).await;
        let mut usage = state.usage.lock().await;
        usage.concurrent_in_flight = usage.concurrent_in_flight.saturating_sub(1);
    }

    /// Account a completed call (§4.2 "Accounting").
    pub async fn record(&self, provider: &str, tokens: u64, latency_ms: u64, success: bool) {
        let now = Utc::now();
        let state = self.provider_state(provider).await;
        let limits = state.limits.read().await.clone();
        let mut usage = state.usage.lock().await;
        usage.record_request(now, tokens, latency_ms, success);

        if let Some(rate) = limits.cost_per_1k_tokens {
            let cost = (tokens as f64 / 1000.0) * rate;
            usage.cost_today += cost;
            drop(usage);
            let mut global = self.global_cost_today.lock().await;
            let today = now.with_timezone(&Local).date_naive();
            if global.0 != today {
                *global = (today, 0.0);
            }
            global.1 += cost;
        }

        info!(provider, tokens, latency_ms, success, "quota: recorded request");
        self.emit(QuotaEvent::Request {
            provider: provider.to_string(),
            tokens,
            latency_ms,
            success,
        });
    }

    /// §4.5 "on transport rate-limit failure, call recordRateLimitError".
    pub async fn record_rate_limit_error(&self, provider: &str) {
        let now = Utc::now();
        let state = self.provider_state(provider).await;
        let limits = state.limits.read().await.clone();
        if !limits.auto_throttle {
            return;
        }
        let mut usage = state.usage.lock().await;
        usage.throttled = true;
        usage.throttle_end = Some(now + chrono::Duration::seconds(limits.throttle_duration_secs));
        warn!(provider, throttle_duration_secs = limits.throttle_duration_secs, "quota: provider throttled after rate-limit error");
        self.emit(QuotaEvent::Throttled {
            provider: provider.to_string(),
            until_ms: usage.throttle_end.map(|t| t.timestamp_millis()).unwrap_or_default(),
        });
    }

    /// Admin override — clears a throttle regardless of `throttle_end`.
    pub async fn unthrottle(&self, provider: &str) {
        let state = self.provider_state(provider).await;
        let mut usage = state.usage.lock().await;
        usage.throttled = false;
        usage.throttle_end = None;
        self.emit(QuotaEvent::Unthrottled { provider: provider.to_string() });
    }

    pub async fn snapshot(&self, provider: &str) -> ProviderUsage {
        let state = self.provider_state(provider).await;
        let mut usage = state.usage.lock().await;
        usage.roll_windows(Utc::now());
        usage.clone()
    }
}

fn ms_until_next_local_day(now: DateTime<Utc>) -> u64 {
    let local_now = now.with_timezone(&Local);
    let next_midnight = (local_now.date_naive() + chrono::Duration::days(1))
        .and_hms_opt(0, 0, 0)
        .expect("midnight is always a valid time")
        .and_local_timezone(Local)
        .single()
        .unwrap_or(local_now);
    (next_midnight.with_timezone(&Utc) - now).num_milliseconds().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn denies_after_rpm_exhausted() {
        // §8 scenario 4
        let qm = QuotaManager::new(0.8);
        qm.set_limits("p", ProviderLimits { requests_per_minute: 2, ..ProviderLimits::generic() }).await;

        qm.record("p", 100, 50, true).await;
        qm.record("p", 100, 50, true).await;

        let result = qm.check("p").await;
        assert!(!result.allowed);
        assert!(result.reason.unwrap().contains("requests per minute"));
        assert!(result.wait_ms.unwrap() <= 60_000);
    }

    #[tokio::test]
    async fn disabled_manager_always_allows() {
        let qm = QuotaManager::new(0.8);
        qm.set_limits("p", ProviderLimits { requests_per_minute: 1, ..ProviderLimits::generic() }).await;
        qm.record("p", 10, 10, true).await;
        qm.set_enabled(false).await;
        assert!(qm.check("p").await.allowed);
    }

    #[tokio::test]
    async fn toggling_enabled_leaves_counters_unchanged() {
        // §8 "setEnabled(false); setEnabled(true) leaves quota counters unchanged"
        let qm = QuotaManager::new(0.8);
        qm.record("p", 500, 10, true).await;
        let before = qm.snapshot("p").await;

        qm.set_enabled(false).await;
        qm.set_enabled(true).await;

        let after = qm.snapshot("p").await;
        assert_eq!(before.requests_this_minute, after.requests_this_minute);
        assert_eq!(before.tokens_this_minute, after.tokens_this_minute);
    }

    #[tokio::test]
    async fn concurrency_gate_denies_at_max() {
        let qm = QuotaManager::new(0.8);
        qm.set_limits("p", ProviderLimits { max_concurrent: 1, ..ProviderLimits::generic() }).await;
        qm.start("p").await;
        let result = qm.check("p").await;
        assert!(!result.allowed);
        assert_eq!(result.wait_ms, Some(1_000));
        qm.finish("p").await;
        assert!(qm.check("p").await.allowed);
    }

    #[tokio::test]
    async fn rate_limit_error_throttles_when_auto_throttle_is_on() {
        let qm = QuotaManager::new(0.8);
        qm.record_rate_limit_error("p").await;
        let result = qm.check("p").await;
        assert!(!result.allowed);
        assert!(result.reason.unwrap().contains("throttled"));
    }

    #[tokio::test]
    async fn unthrottle_is_an_admin_override() {
        let qm = QuotaManager::new(0.8);
        qm.record_rate_limit_error("p").await;
        qm.unthrottle("p").await;
        assert!(qm.check("p").await.allowed);
    }

    #[tokio::test]
    async fn unknown_provider_gets_generic_defaults() {
        let qm = QuotaManager::new(0.8);
        let snapshot = qm.snapshot("some-custom-provider").await;
        assert_eq!(snapshot.requests_this_minute, 0);
    }
}

//! C8 — Session Health Monitor: per-process health state machine with
//! backoff restart (§4.8), modeled on the teacher's periodic
//! `tokio::select!` background-task pattern.

mod config;
mod events;
mod status;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use tokio::sync::{broadcast, watch, Mutex};
use tracing::{info, warn};

pub use config::HealthConfig;
pub use events::HealthEvent;
pub use status::{HealthStatus, SessionHealth};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Caller-provided recovery action (§4.8 "Recovery").
#[async_trait]
pub trait Restarter: Send + Sync {
    async fn restart(&self, session_id: &str, reason: &str) -> bool;
}

struct Registration {
    port: u16,
}

pub struct HealthMonitor {
    config: HealthConfig,
    sessions: Mutex<HashMap<String, SessionHealth>>,
    registrations: Mutex<HashMap<String, Registration>>,
    events: broadcast::Sender<HealthEvent>,
    client: reqwest::Client,
    restarter: Arc<dyn Restarter>,
}

impl HealthMonitor {
    pub fn new(config: HealthConfig, restarter: Arc<dyn Restarter>) -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            config,
            sessions: Mutex::new(HashMap::new()),
            registrations: Mutex::new(HashMap::new()),
            events: tx,
            client: reqwest::Client::new(),
            restarter,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<HealthEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: HealthEvent) {
        let _ = self.events.send(event);
    }

    pub async fn register(&self, session_id: impl Into<String>, port: u16) {
        let session_id = session_id.into();
        self.registrations.lock().await.insert(session_id.clone(), Registration { port });
        self.sessions.lock().await.insert(session_id, SessionHealth::new(Utc::now()));
    }

    pub async fn unregister(&self, session_id: &str) {
        self.registrations.lock().await.remove(session_id);
        self.sessions.lock().await.remove(session_id);
    }

    pub async fn status(&self, session_id: &str) -> Option<SessionHealth> {
        self.sessions.lock().await.get(session_id).cloned()
    }

    /// Check every registered session in parallel (one tick, §4.8 "Checks
    /// run on a periodic timer ... all sessions are checked in parallel").
    pub async fn check_all(&self) {
        let ids: Vec<String> = self.registrations.lock().await.keys().cloned().collect();
        join_all(ids.iter().map(|id| self.check_one(id))).await;
    }

    async fn check_one(&self, session_id: &str) {
        let port = match self.registrations.lock().await.get(session_id) {
            Some(r) => r.port,
            None => return,
        };

        let url = format!("http://localhost:{port}{}", self.config.health_endpoint);
        let outcome = tokio::time::timeout(
            Duration::from_millis(self.config.timeout_ms),
            self.client.get(&url).send(),
        )
        .await;

        let healthy = matches!(outcome, Ok(Ok(resp)) if resp.status().is_success());
        let error_message = match &outcome {
            Ok(Ok(resp)) if !resp.status().is_success() => Some(format!("health check returned {}", resp.status())),
            Ok(Err(err)) => Some(err.to_string()),
            Err(_) => Some("health check timed out".to_string()),
            _ => None,
        };

        self.record_check(session_id, healthy, error_message).await;
    }

    async fn record_check(&self, session_id: &str, healthy: bool, error_message: Option<String>) {
        let now = Utc::now();
        let entered_unresponsive;
        {
            let mut sessions = self.sessions.lock().await;
            let Some(health) = sessions.get_mut(session_id) else { return };
            if health.status.is_terminal() {
                return;
            }

            health.last_check = now;
            if healthy {
                health.consecutive_failures = 0;
                health.status = HealthStatus::Healthy;
                health.last_error = None;
                entered_unresponsive = false;
            } else {
                health.consecutive_failures += 1;
                health.last_error = error_message;
                if health.consecutive_failures >= self.config.max_failures {
                    entered_unresponsive = health.status != HealthStatus::Unresponsive;
                    health.status = HealthStatus::Unresponsive;
                } else {
                    health.status = HealthStatus::Degraded;
                    entered_unresponsive = false;
                }
            }
        }

        self.emit(HealthEvent::SessionUpdate { session_id: session_id.to_string(), status: self.current_status(session_id).await });

        if entered_unresponsive {
            self.emit(HealthEvent::Error {
                session_id: session_id.to_string(),
                message: "session became unresponsive".to_string(),
                recoverable: true,
            });
            self.recover(session_id.to_string()).await;
        }
    }

    async fn current_status(&self, session_id: &str) -> HealthStatus {
        self.sessions.lock().await.get(session_id).map(|h| h.status).unwrap_or(HealthStatus::Crashed)
    }

    /// Retry `restart` with exponential backoff until it succeeds or
    /// `maxRestartAttempts` is exhausted (§4.8).
    async fn recover(&self, session_id: String) {
        loop {
            let restart_count = match self.sessions.lock().await.get(&session_id) {
                Some(h) => h.restart_count,
                None => return,
            };

            let delay = self.config.backoff_delay_ms(restart_count);
            tokio::time::sleep(Duration::from_millis(delay)).await;

            let ok = self.restarter.restart(&session_id, "unresponsive").await;

            let mut sessions = self.sessions.lock().await;
            let Some(health) = sessions.get_mut(&session_id) else { return };
            health.restart_count += 1;

            if ok {
                health.consecutive_failures = 0;
                health.status = HealthStatus::Healthy;
                health.last_restart = Some(Utc::now());
                drop(sessions);
                self.emit(HealthEvent::SessionUpdate { session_id: session_id.clone(), status: HealthStatus::Healthy });
                info!(session_id, "session recovered after restart");
                return;
            }

            health.last_restart = Some(Utc::now());
            if health.restart_count >= self.config.max_restart_attempts {
                health.status = HealthStatus::Crashed;
                drop(sessions);
                warn!(session_id, "session exhausted restart attempts, marking crashed");
                self.emit(HealthEvent::SessionUpdate { session_id: session_id.clone(), status: HealthStatus::Crashed });
                self.emit(HealthEvent::Error {
                    session_id: session_id.clone(),
                    message: "restart attempts exhausted".to_string(),
                    recoverable: false,
                });
                return;
            }
        }
    }

    /// Spawn the periodic check loop; stops when `shutdown` fires.
    pub fn spawn(self: Arc<Self>, shutdown: &watch::Sender<bool>) {
        let mut rx = shutdown.subscribe();
        let interval = Duration::from_millis(self.config.interval_ms);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {
                        self.check_all().await;
                    }
                    changed = rx.changed() => {
                        if changed.is_ok() && *rx.borrow() {
                            break;
                        }
                    }
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct AlwaysFails;
    #[async_trait]
    impl Restarter for AlwaysFails {
        async fn restart(&self, _session_id: &str, _reason: &str) -> bool {
            false
        }
    }

    struct SucceedsAfter {
        attempts: AtomicU32,
        succeed_at: u32,
    }
    #[async_trait]
    impl Restarter for SucceedsAfter {
        async fn restart(&self, _session_id: &str, _reason: &str) -> bool {
            let n = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            n >= self.succeed_at
        }
    }

    fn fast_config() -> HealthConfig {
        HealthConfig { max_failures: 3, restart_delay_ms: 1, backoff_multiplier: 1.0, max_backoff_ms: 2, max_restart_attempts: 2, ..Default::default() }
    }

    #[tokio::test]
    async fn exactly_max_failures_triggers_unresponsive_on_that_tick() {
        let monitor = HealthMonitor::new(fast_config(), Arc::new(AlwaysFails));
        monitor.register("s1", 9999).await;

        monitor.record_check("s1", false, Some("err".into())).await;
        assert_eq!(monitor.status("s1").await.unwrap().status, HealthStatus::Degraded);
        monitor.record_check("s1", false, Some("err".into())).await;
        assert_eq!(monitor.status("s1").await.unwrap().status, HealthStatus::Degraded);
        monitor.record_check("s1", false, Some("err".into())).await;
        // Third consecutive failure crosses max_failures=3 and triggers the
        // recovery loop, which (AlwaysFails) exhausts attempts and crashes.
        assert_eq!(monitor.status("s1").await.unwrap().status, HealthStatus::Crashed);
    }

    #[tokio::test]
    async fn recovers_to_healthy_when_restart_eventually_succeeds() {
        let restarter = Arc::new(SucceedsAfter { attempts: AtomicU32::new(0), succeed_at: 1 });
        let monitor = HealthMonitor::new(fast_config(), restarter);
        monitor.register("s1", 9999).await;
        for _ in 0..3 {
            monitor.record_check("s1", false, Some("err".into())).await;
        }
        assert_eq!(monitor.status("s1").await.unwrap().status, HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn crashed_is_terminal() {
        let monitor = HealthMonitor::new(fast_config(), Arc::new(AlwaysFails));
        monitor.register("s1", 9999).await;
        for _ in 0..3 {
            monitor.record_check("s1", false, Some("err".into())).await;
        }
        assert_eq!(monitor.status("s1").await.unwrap().status, HealthStatus::Crashed);
        monitor.record_check("s1", true, None).await;
        assert_eq!(monitor.status("s1").await.unwrap().status, HealthStatus::Crashed);
    }
}

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use council_core::Message;

use crate::{Supervisor, SupervisorError};

/// Deterministic test double for [`Supervisor`]. Configure a canned reply
/// (or a failure) and an optional artificial latency, then hand it to any
/// component under test — grounded on the `DummyTool` pattern the teacher
/// uses for its own trait test doubles.
#[derive(Clone)]
pub struct MockSupervisor {
    name: String,
    provider: String,
    reply: Arc<String>,
    fail_with: Option<Arc<str>>,
    latency: Duration,
    available: Arc<AtomicBool>,
    calls: Arc<AtomicU64>,
}

impl MockSupervisor {
    pub fn new(name: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider: provider.into(),
            reply: Arc::new(String::new()),
            fail_with: None,
            latency: Duration::ZERO,
            available: Arc::new(AtomicBool::new(true)),
            calls: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Canned reply in the exact `VOTE/CONFIDENCE/REASONING` format the
    /// orchestrator's vote parser expects (§6).
    pub fn approve(mut self, reasoning: impl Into<String>, confidence: f64) -> Self {
        self.reply = Arc::new(format!(
            "VOTE: APPROVE\nCONFIDENCE: {confidence}\nREASONING: {}",
            reasoning.into()
        ));
        self
    }

    pub fn reject(mut self, reasoning: impl Into<String>, confidence: f64) -> Self {
        self.reply = Arc::new(format!(
            "VOTE: REJECT\nCONFIDENCE: {confidence}\nREASONING: {}",
            reasoning.into()
        ));
        self
    }

    pub fn replying(mut self, text: impl Into<String>) -> Self {
        self.reply = Arc::new(text.into());
        self
    }

    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.fail_with = Some(Arc::from(message.into()));
        self
    }

    pub fn rate_limited(mut self) -> Self {
        self.fail_with = Some(Arc::from("rate-limited"));
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn unavailable(self) -> Self {
        self.available.store(false, Ordering::SeqCst);
        self
    }

    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Supervisor for MockSupervisor {
    fn name(&self) -> &str {
        &self.name
    }

    fn provider(&self) -> &str {
        &self.provider
    }

    async fn chat(&self, _messages: &[Message]) -> Result<String, SupervisorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if let Some(reason) = &self.fail_with {
            return if reason.as_ref() == "rate-limited" {
                Err(SupervisorError::RateLimited { provider: self.provider.clone() })
            } else {
                Err(SupervisorError::Transport {
                    provider: self.provider.clone(),
                    message: reason.to_string(),
                })
            };
        }
        Ok((*self.reply).clone())
    }

    async fn available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }
}

//! C1 — Supervisor Capability.
//!
//! A `Supervisor` is a polymorphic handle to one provider-backed LLM acting
//! as a reviewer. The core never interprets provider-specific errors — a
//! failing `chat` call surfaces as the generic [`SupervisorError`] signal and
//! retries are left to the caller (§4.1, §7).

mod http;
mod mock;

use async_trait::async_trait;
use council_core::Message;

pub use http::{HttpSupervisor, HttpSupervisorConfig};
pub use mock::MockSupervisor;

/// The one closed, typed error the spec calls out by name. Everything else
/// in this workspace propagates `anyhow::Result`; this type exists because
/// callers (the quota manager, the orchestrator) must branch on
/// `.retryable()`.
#[derive(Debug, thiserror::Error, Clone)]
pub enum SupervisorError {
    #[error("transport error talking to {provider}: {message}")]
    Transport { provider: String, message: String },

    #[error("{provider} rate-limited the request")]
    RateLimited { provider: String },

    #[error("{provider} call timed out after {timeout_ms}ms")]
    Timeout { provider: String, timeout_ms: u64 },
}

impl SupervisorError {
    /// Whether the caller's retry policy (outside this core, §4.1) should
    /// consider retrying this failure.
    pub fn retryable(&self) -> bool {
        match self {
            SupervisorError::Transport { .. } => true,
            SupervisorError::RateLimited { .. } => true,
            SupervisorError::Timeout { .. } => true,
        }
    }

    /// Whether this failure should trigger the quota manager's throttle
    /// path (§4.5 "on transport rate-limit failure, recordRateLimitError").
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, SupervisorError::RateLimited { .. })
    }

    pub fn provider(&self) -> &str {
        match self {
            SupervisorError::Transport { provider, .. }
            | SupervisorError::RateLimited { provider }
            | SupervisorError::Timeout { provider, .. } => provider,
        }
    }
}

/// A reviewer backed by a provider. Implementations are polymorphic over
/// OpenAI-style, Anthropic-style, Gemini-style, and custom OpenAI-compatible
/// backends — none of that distinction is visible above this trait.
#[async_trait]
pub trait Supervisor: Send + Sync {
    /// Unique name identifying this supervisor within a debate.
    fn name(&self) -> &str;

    /// Provider tag, used to key quota accounting (§4.2) and default limits.
    fn provider(&self) -> &str;

    /// Optional model hint (for telemetry/selection only — never interpreted
    /// by the core).
    fn model(&self) -> Option<&str> {
        None
    }

    /// Send a full message sequence and get back the assistant's reply text.
    async fn chat(&self, messages: &[Message]) -> Result<String, SupervisorError>;

    /// Cheap liveness probe, used by the orchestrator's planning step (§4.5)
    /// and by the health monitor's availability gating.
    async fn available(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_supervisor_is_available_by_default() {
        let sup = MockSupervisor::new("gpt-4", "openai").approve("looks good", 0.9);
        assert!(sup.available().await);
        assert_eq!(sup.name(), "gpt-4");
        assert_eq!(sup.provider(), "openai");
    }

    #[tokio::test]
    async fn mock_supervisor_can_fail_on_demand() {
        let sup = MockSupervisor::new("flaky", "grok").failing("boom");
        let messages = vec![Message::user("hi")];
        let err = sup.chat(&messages).await.unwrap_err();
        assert!(err.retryable());
    }
}

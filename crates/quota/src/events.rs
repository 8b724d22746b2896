use serde::{Deserialize, Serialize};

/// Typed event stream emitted by [`crate::QuotaManager`] (§4.2, §9).
/// Subscribers attach via [`crate::QuotaManager::subscribe`] and each
/// receives its own copy — no shared listener list outlives a subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum QuotaEvent {
    Request { provider: String, tokens: u64, latency_ms: u64, success: bool },
    Throttled { provider: String, until_ms: i64 },
    Unthrottled { provider: String },
    Alert { provider: String, utilization: f64, dimension: String },
    ConfigChanged { provider: String },
}

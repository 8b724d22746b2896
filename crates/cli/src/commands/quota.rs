use anyhow::Result;
use council_quota::{ProviderLimits, QuotaManager};

/// `council quota status [--provider P]` (§6).
///
/// Quota state lives for process lifetime only (§3 "Lifecycles") — a fresh
/// CLI invocation reports the default limits and a zeroed snapshot for the
/// requested provider, not cross-invocation usage.
pub async fn status(provider: Option<&str>, config: &council_config::EngineConfig) -> Result<()> {
    let manager = QuotaManager::new(config.quota.alert_threshold);
    manager.set_enabled(config.quota.enabled).await;

    let provider = provider.unwrap_or("openai");
    let limits = ProviderLimits::for_provider(provider);
    let snapshot = manager.snapshot(provider).await;

    println!("provider: {provider}");
    println!("limits: {}", serde_json::to_string_pretty(&limits)?);
    println!("snapshot: {}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

/// `council quota unthrottle --provider P` (§6).
pub async fn unthrottle(provider: &str, config: &council_config::EngineConfig) -> Result<()> {
    let manager = QuotaManager::new(config.quota.alert_threshold);
    manager.unthrottle(provider).await;
    println!("provider '{provider}' unthrottled (this only affects this process's in-memory state)");
    Ok(())
}

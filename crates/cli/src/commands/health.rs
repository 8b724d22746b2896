use anyhow::Result;

/// `council health status` (§6).
///
/// The health monitor tracks live spawned CLI processes (§4.8); a
/// standalone CLI invocation has none registered, so this reports the
/// configured thresholds rather than any session's live status.
pub async fn status(config: &council_config::EngineConfig) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&config.health)?);
    Ok(())
}

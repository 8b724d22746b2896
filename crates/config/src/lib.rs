use std::fs;
use std::path::Path;

use anyhow::Result;
use council_core::ConsensusMode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaConfig {
    pub enabled: bool,
    pub alert_threshold: f64,
    pub global_daily_budget_usd: Option<f64>,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self { enabled: true, alert_threshold: 0.8, global_daily_budget_usd: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamConfig {
    pub dynamic_selection_enabled: bool,
}

impl Default for TeamConfig {
    fn default() -> Self {
        Self { dynamic_selection_enabled: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    pub max_rounds: u32,
    pub consensus_mode: ConsensusMode,
    pub consensus_threshold: f64,
    pub persist_history: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self { max_rounds: 3, consensus_mode: ConsensusMode::Weighted, consensus_threshold: 0.5, persist_history: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    pub interval_ms: u64,
    pub timeout_ms: u64,
    pub health_endpoint: String,
    pub max_failures: u32,
    pub restart_delay_ms: u64,
    pub backoff_multiplier: f64,
    pub max_backoff_ms: u64,
    pub max_restart_attempts: u32,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            interval_ms: 10_000,
            timeout_ms: 3_000,
            health_endpoint: "/health".to_string(),
            max_failures: 3,
            restart_delay_ms: 1_000,
            backoff_multiplier: 2.0,
            max_backoff_ms: 60_000,
            max_restart_attempts: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub storage_path: Option<String>,
    pub retention_days: Option<i64>,
    pub max_records: Option<usize>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { storage_path: Some("council-history.jsonl".to_string()), retention_days: None, max_records: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    pub sessions_path: Option<String>,
    pub max_persisted_sessions: usize,
    pub flush_interval_ms: u64,
    pub max_logs_per_session: usize,
    pub max_log_age_ms: i64,
    pub prune_interval_ms: u64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            sessions_path: Some("council-sessions.json".to_string()),
            max_persisted_sessions: 500,
            flush_interval_ms: 5_000,
            max_logs_per_session: 1_000,
            max_log_age_ms: 24 * 60 * 60 * 1000,
            prune_interval_ms: 60_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string() }
    }
}

/// Top-level engine configuration, the `council-cli` entry point's
/// single source of truth, following the same per-section
/// `#[serde(default)]` shape as the teacher's `AppConfig`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub quota: QuotaConfig,
    pub team: TeamConfig,
    pub orchestrator: OrchestratorConfig,
    pub health: HealthConfig,
    pub history: HistoryConfig,
    pub persistence: PersistenceConfig,
    pub telemetry: TelemetryConfig,
}

impl EngineConfig {
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::default();
        if let Ok(raw) = fs::read_to_string(path) {
            config = toml::from_str(&raw)?;
        }
        Ok(config)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        let rendered = toml::to_string_pretty(self)?;
        fs::write(path, rendered)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = EngineConfig::default();
        let rendered = toml::to_string_pretty(&config).unwrap();
        let parsed: EngineConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.orchestrator.max_rounds, config.orchestrator.max_rounds);
    }

    #[test]
    fn partial_toml_file_falls_back_to_section_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("council.toml");
        fs::write(&path, "[quota]\nalert_threshold = 0.95\n").unwrap();

        let config = EngineConfig::load_from(&path).unwrap();
        assert_eq!(config.quota.alert_threshold, 0.95);
        assert_eq!(config.orchestrator.max_rounds, OrchestratorConfig::default().max_rounds);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let config = EngineConfig::load_from("/nonexistent/council.toml").unwrap();
        assert_eq!(config.health.max_failures, HealthConfig::default().max_failures);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("council.toml");
        let mut config = EngineConfig::default();
        config.telemetry.log_level = "debug".to_string();
        config.save_to(&path).unwrap();

        let loaded = EngineConfig::load_from(&path).unwrap();
        assert_eq!(loaded.telemetry.log_level, "debug");
    }
}

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use council_core::{ConsensusMode, Task};
use council_history::{HistoryStore, RetentionPolicy};
use council_orchestrator::{Orchestrator, OrchestratorConfig};
use council_quota::QuotaManager;
use council_team::TeamSelector;

use crate::providers;

/// `council debate --task-file <path> [--rounds N] [--consensus MODE]` (§6).
pub async fn run(task_file: &Path, rounds: Option<u32>, consensus: Option<ConsensusMode>, config: &council_config::EngineConfig) -> Result<()> {
    let raw = tokio::fs::read_to_string(task_file)
        .await
        .with_context(|| format!("reading task file {}", task_file.display()))?;
    let task: Task = serde_json::from_str(&raw).context("task file must be a JSON object matching the Task shape")?;

    let history_path = config.history.storage_path.clone();
    let history = match history_path {
        Some(path) => Some(Arc::new(HistoryStore::open(
            path,
            RetentionPolicy { retention_days: config.history.retention_days, max_records: config.history.max_records },
        )?)),
        None => None,
    };

    let quota = Arc::new(QuotaManager::new(config.quota.alert_threshold));
    quota.set_global_daily_budget(config.quota.global_daily_budget_usd).await;
    quota.set_enabled(config.quota.enabled).await;

    let mut team_selector = TeamSelector::default();
    team_selector.set_enabled(config.team.dynamic_selection_enabled);

    let orch_config = OrchestratorConfig {
        max_rounds: rounds.unwrap_or(config.orchestrator.max_rounds),
        consensus_mode: consensus.unwrap_or(config.orchestrator.consensus_mode),
        consensus_threshold: config.orchestrator.consensus_threshold,
        persist_history: config.orchestrator.persist_history && history.is_some(),
        session_id: None,
    };

    let orchestrator = Orchestrator::new(orch_config, quota, team_selector, history);

    for supervisor in providers::supervisors_from_env(config.health.timeout_ms) {
        orchestrator.register_supervisor(supervisor).await;
    }

    let decision = orchestrator.debate(task).await?;
    println!("{}", serde_json::to_string_pretty(&decision)?);
    Ok(())
}

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use council_history::{ExportFormat, HistoryStore, QueryFilters, RetentionPolicy};

fn open_store(config: &council_config::EngineConfig) -> Result<HistoryStore> {
    let path = config
        .history
        .storage_path
        .clone()
        .unwrap_or_else(|| "council-history.jsonl".to_string());
    HistoryStore::open(
        path,
        RetentionPolicy { retention_days: config.history.retention_days, max_records: config.history.max_records },
    )
}

/// `council history query [--approved] [--task-type T] [--limit N]` (§6).
pub async fn query(
    config: &council_config::EngineConfig,
    approved: Option<bool>,
    task_type: Option<String>,
    limit: Option<usize>,
) -> Result<()> {
    let store = open_store(config)?;
    let filters = QueryFilters { approved, task_type, limit, ..Default::default() };
    let records = store.query(&filters).await;
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

/// `council history stats` (§6).
pub async fn stats(config: &council_config::EngineConfig) -> Result<()> {
    let store = open_store(config)?;
    let stats = store.stats().await;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

/// `council history export --format json|csv --out <path>` (§6).
pub async fn export(config: &council_config::EngineConfig, format: &str, out: &PathBuf) -> Result<()> {
    let store = open_store(config)?;
    let rendered = match format {
        "json" => store.export(ExportFormat::Json).await?,
        "csv" => store.export(ExportFormat::Csv).await?,
        other => bail!("unknown export format '{other}', expected json or csv"),
    };
    tokio::fs::write(out, rendered).await.with_context(|| format!("writing export to {}", out.display()))?;
    println!("exported to {}", out.display());
    Ok(())
}

use anyhow::{bail, Context, Result};
use council_core::ConsensusMode;
use council_history::{HistoryStore, RetentionPolicy};
use council_simulator::{Bias, ReplayConfig, SimulateParams, Simulator};

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

/// `council simulate replay --id <debate_id> [--consensus MODE]` (§6).
pub async fn replay(config: &council_config::EngineConfig, id: &str, consensus: Option<ConsensusMode>) -> Result<()> {
    let store = open_store(config)?;
    let Some(record) = store.get(id).await else { bail!("no stored debate with id '{id}'") };
    let stored = council_simulator::StoredDebate::from_record(&record);

    let simulator = Simulator::new(None);
    let replay_config = ReplayConfig { consensus_mode: consensus, team_filter: None };
    let result = simulator.replay(&stored, &replay_config);

    println!("new_outcome: {}", result.new_outcome.as_str());
    println!("outcome_changed: {}", result.outcome_changed);
    println!("analysis: {}", result.analysis);
    Ok(())
}

/// `council simulate whatif --id <debate_id> --scenario <json>` (§6).
/// `--scenario` may repeat; each value is a JSON object
/// `{"consensus_mode": "...", "team_filter": [...]}`.
pub async fn whatif(config: &council_config::EngineConfig, id: &str, scenarios: &[String]) -> Result<()> {
    let store = open_store(config)?;
    let Some(record) = store.get(id).await else { bail!("no stored debate with id '{id}'") };
    let stored = council_simulator::StoredDebate::from_record(&record);

    let parsed: Vec<ReplayConfig> = scenarios
        .iter()
        .map(|raw| parse_scenario(raw))
        .collect::<Result<_>>()?;

    let simulator = Simulator::new(None);
    let results = simulator.what_if(&stored, &parsed);
    for (scenario, result) in scenarios.iter().zip(results.iter()) {
        println!(
            "scenario {scenario} -> outcome={} changed={} analysis=\"{}\"",
            result.new_outcome.as_str(),
            result.outcome_changed,
            result.analysis
        );
    }
    Ok(())
}

fn parse_scenario(raw: &str) -> Result<ReplayConfig> {
    #[derive(serde::Deserialize)]
    struct Wire {
        consensus_mode: Option<ConsensusMode>,
        team_filter: Option<Vec<String>>,
    }
    let wire: Wire = serde_json::from_str(raw).context("--scenario must be a JSON object with optional consensus_mode/team_filter")?;
    Ok(ReplayConfig { consensus_mode: wire.consensus_mode, team_filter: wire.team_filter })
}

/// `council simulate synth --topic T --team a,b,c [--randomize]` (§6).
pub async fn synth(
    topic: &str,
    team: &str,
    mode: ConsensusMode,
    max_rounds: u32,
    randomize: bool,
    bias_toward: Option<&str>,
) -> Result<()> {
    let bias = match bias_toward {
        Some("approve") => Some(Bias::Approve),
        Some("reject") => Some(Bias::Reject),
        Some(other) => bail!("unknown --bias-toward '{other}', expected approve or reject"),
        None => None,
    };

    let params = SimulateParams {
        topic: topic.to_string(),
        context: String::new(),
        mode,
        team: team.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect(),
        max_rounds,
        mock_responses: None,
        randomize,
        bias_toward: bias,
    };

    let simulator = Simulator::new(None);
    let result = simulator.simulate(&params);
    println!("id: {}", result.debate.id);
    println!("outcome: {}", result.outcome.as_str());
    println!("rounds: {}", result.debate.rounds.len());
    Ok(())
}

mod commands;
mod providers;

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use council_core::ConsensusMode;
use tracing_subscriber::EnvFilter;

const CONFIG_PATH: &str = "council.toml";

#[derive(Debug, Parser)]
#[command(name = "council", version, about = "Multi-supervisor deliberation engine")]
struct Cli {
    #[arg(long, global = true, default_value = CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a debate over a task described in a JSON file.
    Debate {
        #[arg(long, value_name = "PATH")]
        task_file: PathBuf,
        #[arg(long)]
        rounds: Option<u32>,
        #[arg(long, value_name = "MODE")]
        consensus: Option<String>,
    },
    /// Query, summarize, or export the persisted debate history.
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
    /// Replay, what-if, or synthesize debates without hitting any provider.
    Simulate {
        #[command(subcommand)]
        command: SimulateCommands,
    },
    /// Inspect or override per-provider quota state.
    Quota {
        #[command(subcommand)]
        command: QuotaCommands,
    },
    /// Inspect session health monitor configuration.
    Health {
        #[command(subcommand)]
        command: HealthCommands,
    },
}

#[derive(Debug, Subcommand)]
enum HistoryCommands {
    Query {
        #[arg(long)]
        approved: Option<bool>,
        #[arg(long, value_name = "TYPE")]
        task_type: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
    },
    Stats,
    Export {
        #[arg(long, value_name = "json|csv")]
        format: String,
        #[arg(long, value_name = "PATH")]
        out: PathBuf,
    },
}

#[derive(Debug, Subcommand)]
enum SimulateCommands {
    Replay {
        #[arg(long)]
        id: String,
        #[arg(long, value_name = "MODE")]
        consensus: Option<String>,
    },
    Whatif {
        #[arg(long)]
        id: String,
        #[arg(long = "scenario", value_name = "JSON")]
        scenarios: Vec<String>,
    },
    Synth {
        #[arg(long)]
        topic: String,
        #[arg(long, value_name = "a,b,c")]
        team: String,
        #[arg(long, value_name = "MODE", default_value = "weighted")]
        mode: String,
        #[arg(long, default_value_t = 3)]
        max_rounds: u32,
        #[arg(long)]
        randomize: bool,
        #[arg(long, value_name = "approve|reject")]
        bias_toward: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
enum QuotaCommands {
    Status {
        #[arg(long)]
        provider: Option<String>,
    },
    Unthrottle {
        #[arg(long)]
        provider: String,
    },
}

#[derive(Debug, Subcommand)]
enum HealthCommands {
    Status,
}

/// Parses a wire-visible consensus mode string (§6). Kept separate from
/// `clap::ValueEnum` since the same strings are also accepted from JSON
/// scenario bodies and task files.
fn parse_consensus_mode(raw: &str) -> Result<ConsensusMode> {
    ConsensusMode::ALL
        .into_iter()
        .find(|m| m.as_str() == raw)
        .ok_or_else(|| {
            let known: Vec<&str> = ConsensusMode::ALL.iter().map(|m| m.as_str()).collect();
            anyhow::anyhow!("unknown consensus mode '{raw}', expected one of: {}", known.join(", "))
        })
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    let config = council_config::EngineConfig::load_from(&cli.config)?;

    match cli.command {
        Commands::Debate { task_file, rounds, consensus } => {
            let consensus = consensus.map(|c| parse_consensus_mode(&c)).transpose()?;
            commands::debate::run(&task_file, rounds, consensus, &config).await
        }
        Commands::History { command } => match command {
            HistoryCommands::Query { approved, task_type, limit } => commands::history::query(&config, approved, task_type, limit).await,
            HistoryCommands::Stats => commands::history::stats(&config).await,
            HistoryCommands::Export { format, out } => commands::history::export(&config, &format, &out).await,
        },
        Commands::Simulate { command } => match command {
            SimulateCommands::Replay { id, consensus } => {
                let consensus = consensus.map(|c| parse_consensus_mode(&c)).transpose()?;
                commands::simulate::replay(&config, &id, consensus).await
            }
            SimulateCommands::Whatif { id, scenarios } => commands::simulate::whatif(&config, &id, &scenarios).await,
            SimulateCommands::Synth { topic, team, mode, max_rounds, randomize, bias_toward } => {
                let mode = parse_consensus_mode(&mode)?;
                if team.trim().is_empty() {
                    bail!("--team must list at least one supervisor name");
                }
                commands::simulate::synth(&topic, &team, mode, max_rounds, randomize, bias_toward.as_deref()).await
            }
        },
        Commands::Quota { command } => match command {
            QuotaCommands::Status { provider } => commands::quota::status(provider.as_deref(), &config).await,
            QuotaCommands::Unthrottle { provider } => commands::quota::unthrottle(&provider, &config).await,
        },
        Commands::Health { command } => match command {
            HealthCommands::Status => commands::health::status(&config).await,
        },
    }
}

// crates/grove-cli/src/main.rs
//
// CLI entrypoint for the Grove collateral farm tools.
//
// Loads a scenario TOML, initializes tracing, and dispatches to the
// simulate, emitted and schedule subcommands.

mod commands;
mod config;
mod output;
mod scenario;

use clap::{Parser, Subcommand};
use commands::emitted::EmittedCmd;
use commands::simulate::SimulateCmd;
use config::ScenarioConfig;

/// Grove CLI: replay collateral farm scenarios and inspect emission schedules.
#[derive(Parser, Debug)]
#[command(
    name = "grove",
    version = "0.1.0",
    about = "Grove CLI: NFT-collateral reward farm scenarios and emission schedules"
)]
struct Cli {
    /// Path to the scenario TOML file [default: ~/.grove/scenario.toml].
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Replay the scenario's steps and print pools, positions and balances.
    Simulate(SimulateCmd),

    /// Total emitted by the scenario's schedule over [from, to).
    Emitted(EmittedCmd),

    /// Print the scenario's emission schedule.
    Schedule,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let path = config::resolve_path(cli.config.as_deref())?;
    let loaded = ScenarioConfig::load(&path);
    let log_level = match &loaded {
        Ok(cfg) => cfg.log_level.clone(),
        Err(_) => "info".to_string(),
    };

    // Initialize tracing subscriber for structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .init();

    // An explicit --config must load; the default path falls back to an
    // empty scenario.
    let scenario_config = match loaded {
        Ok(cfg) => {
            tracing::info!("Loaded scenario from {}", path.display());
            cfg
        }
        Err(e) if cli.config.is_some() => {
            return Err(format!("Could not load scenario from {}: {}", path.display(), e).into());
        }
        Err(e) => {
            tracing::warn!(
                "Could not load scenario from {}: {}. Using defaults.",
                path.display(),
                e
            );
            ScenarioConfig::default()
        }
    };

    match &cli.command {
        Commands::Simulate(cmd) => commands::simulate::run(cmd, &scenario_config)?,
        Commands::Emitted(cmd) => commands::emitted::run(cmd, &scenario_config)?,
        Commands::Schedule => commands::schedule::run(&scenario_config)?,
    }

    Ok(())
}

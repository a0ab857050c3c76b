// crates/grove-cli/src/commands/emitted.rs
//
// `grove emitted --from T --to T`: evaluate the scenario's emission schedule.

use clap::Args;
use serde::Serialize;

use grove_core::{Amount, FarmError, Timestamp};
use grove_economics::{EmissionSchedule, Tokens};

use crate::config::{emission_points, ScenarioConfig};
use crate::output::{format_json, OutputFormat};

#[derive(Debug, Args)]
pub struct EmittedCmd {
    /// Start of the half-open window.
    #[arg(long)]
    pub from: Timestamp,
    /// End of the half-open window.
    #[arg(long)]
    pub to: Timestamp,
    /// Emit JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct Emitted {
    from: Timestamp,
    to: Timestamp,
    units: Amount,
    tokens: String,
}

/// Total emitted by the configured schedule over `[from, to)`. An empty
/// schedule emits nothing.
pub fn total_emitted(config: &ScenarioConfig, from: Timestamp, to: Timestamp) -> Result<Amount, FarmError> {
    let schedule = if config.emission.is_empty() {
        EmissionSchedule::default()
    } else {
        EmissionSchedule::new(emission_points(&config.emission))?
    };
    schedule.total_emitted(from, to)
}

pub fn run(cmd: &EmittedCmd, config: &ScenarioConfig) -> Result<(), Box<dyn std::error::Error>> {
    let units = total_emitted(config, cmd.from, cmd.to)?;
    let tokens = Tokens::from_units(units)
        .with_decimals(config.reward_decimals)
        .to_string();

    match OutputFormat::from_json_flag(cmd.json) {
        OutputFormat::Json => {
            let emitted = Emitted {
                from: cmd.from,
                to: cmd.to,
                units,
                tokens,
            };
            println!("{}", format_json(&emitted));
        }
        OutputFormat::Table => {
            println!("Emitted over [{}, {})", cmd.from, cmd.to);
            println!("  Units:  {}", units);
            println!("  Tokens: {}", tokens);
        }
    }
    Ok(())
}

// crates/grove-cli/src/commands/simulate.rs
//
// `grove simulate`: replay a scenario and print the resulting farm state.

use clap::Args;
use tabled::Tabled;

use grove_core::PoolId;
use grove_economics::SCALE;

use crate::config::ScenarioConfig;
use crate::output::{format_json, print_section, OutputFormat};
use crate::scenario::{Report, Scenario};

#[derive(Debug, Args)]
pub struct SimulateCmd {
    /// Emit the full report as JSON instead of tables.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Tabled)]
pub struct PoolRow {
    #[tabled(rename = "Pool")]
    pub id: PoolId,
    #[tabled(rename = "Collection")]
    pub collection: String,
    #[tabled(rename = "Strength")]
    pub strength: u64,
    #[tabled(rename = "Staked")]
    pub staked: u64,
    #[tabled(rename = "Reward/Item")]
    pub reward_per_item: String,
    #[tabled(rename = "Updated")]
    pub last_reward_time: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Tabled)]
pub struct PositionRow {
    #[tabled(rename = "Pool")]
    pub pool: PoolId,
    #[tabled(rename = "Staker")]
    pub staker: String,
    #[tabled(rename = "Items")]
    pub items: String,
    #[tabled(rename = "Reward Debt")]
    pub reward_debt: String,
    #[tabled(rename = "Pending")]
    pub pending: String,
}

pub fn pool_rows(scenario: &Scenario, report: &Report) -> Vec<PoolRow> {
    report
        .snapshot
        .pools
        .iter()
        .map(|view| PoolRow {
            id: view.id,
            collection: scenario.label_of(&view.pool.collateral),
            strength: view.pool.strength,
            staked: view.pool.amount_staked,
            reward_per_item: scenario.tokens(view.pool.reward_per_share / SCALE),
            last_reward_time: view.pool.last_reward_time,
        })
        .collect()
}

pub fn position_rows(
    scenario: &Scenario,
    report: &Report,
) -> Result<Vec<PositionRow>, Box<dyn std::error::Error>> {
    let mut rows = Vec::new();
    for view in &report.snapshot.positions {
        let pending = scenario.farm().pending_reward(view.pool_id, &view.staker)?;
        let items: Vec<String> = view.items.iter().map(|id| id.to_string()).collect();
        rows.push(PositionRow {
            pool: view.pool_id,
            staker: scenario.label_of(&view.staker),
            items: items.join(", "),
            reward_debt: scenario.tokens(view.position.reward_debt),
            pending: scenario.tokens(pending),
        });
    }
    Ok(rows)
}

pub fn run(cmd: &SimulateCmd, config: &ScenarioConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut scenario = Scenario::build(config)?;
    let outcomes = scenario.run(&config.steps);
    let report = scenario.report(outcomes);

    match OutputFormat::from_json_flag(cmd.json) {
        OutputFormat::Json => println!("{}", format_json(&report)),
        OutputFormat::Table => {
            print_section("Steps", &report.outcomes);
            print_section("Pools", &pool_rows(&scenario, &report));
            print_section("Positions", &position_rows(&scenario, &report)?);
            print_section("Balances", &report.balances);

            println!("Totals");
            println!("  Total strength:    {}", report.snapshot.total_strength);
            println!("  Disbursed:         {}", scenario.tokens(report.snapshot.total_disbursed));
            println!("  Farm reward left:  {}", report.farm_reward_balance);
            println!("  Config version:    {}", report.snapshot.config_version);
            println!("  Ledger consistent: {}", report.invariants_hold);
        }
    }

    if !report.invariants_hold {
        tracing::warn!("Farm ledger disagrees with pool totals after replay");
    }
    Ok(())
}

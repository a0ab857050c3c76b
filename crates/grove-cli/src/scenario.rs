// crates/grove-cli/src/scenario.rs
//
// Wires a scenario configuration into a farm backed by in-memory
// collaborators and replays its steps against a manual clock.
//
// A failing step is recorded in the outcome list and the run continues; the
// farm's all-or-nothing operations guarantee the failure left no trace.

use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use serde::Serialize;
use tabled::Tabled;

use grove_core::{
    Address, Amount, CollaboratorError, FarmError, FungibleToken, NativeCurrency, Timestamp,
};
use grove_economics::{Environment, Farm, FarmSnapshot, Tokens};
use grove_sim::{InMemoryCollection, InMemoryNative, InMemoryToken, ManualClock};

use crate::config::{emission_points, ScenarioConfig, Step};

/// Label of the farm's own account.
pub const FARM_LABEL: &str = "farm";
/// Label of the reward token contract.
pub const REWARD_LABEL: &str = "reward";
/// Sweep asset name for the native currency.
pub const NATIVE_ASSET: &str = "native";

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("unknown collection: {0}")]
    UnknownCollection(String),

    #[error("collection declared twice: {0}")]
    DuplicateCollection(String),

    #[error("step {index} at {at} is earlier than the step before it")]
    StepOutOfOrder { index: usize, at: Timestamp },

    #[error("{0}")]
    Farm(#[from] FarmError),

    #[error("collateral setup failed: {0}")]
    Collateral(#[from] CollaboratorError),
}

/// What happened when a step was replayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct StepOutcome {
    #[tabled(rename = "#")]
    pub index: usize,
    #[tabled(rename = "At")]
    pub at: Timestamp,
    #[tabled(rename = "Action")]
    pub action: String,
    #[tabled(rename = "Caller")]
    pub caller: String,
    #[tabled(rename = "Ok")]
    pub ok: bool,
    #[tabled(rename = "Result")]
    pub result: String,
}

/// End-of-run balances of one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct BalanceRow {
    #[tabled(rename = "Participant")]
    pub label: String,
    #[tabled(rename = "Address")]
    pub address: String,
    #[tabled(rename = "Reward")]
    pub reward: String,
    #[tabled(rename = "Native")]
    pub native: String,
}

/// Everything `grove simulate` prints.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub outcomes: Vec<StepOutcome>,
    pub balances: Vec<BalanceRow>,
    pub farm_reward_balance: String,
    pub invariants_hold: bool,
    pub snapshot: FarmSnapshot,
}

pub struct Scenario {
    clock: Rc<ManualClock>,
    reward: Rc<InMemoryToken>,
    native: Rc<InMemoryNative>,
    collections: BTreeMap<String, Address>,
    participants: BTreeSet<String>,
    admin: String,
    decimals: u32,
    farm: Farm,
}

impl Scenario {
    /// Create the collaborators, fund the farm, mint collateral, and apply
    /// the initial schedule and pools at `start_time`.
    pub fn build(config: &ScenarioConfig) -> Result<Self, ScenarioError> {
        let mut previous = config.start_time;
        for (index, step) in config.steps.iter().enumerate() {
            if step.at() < previous {
                return Err(ScenarioError::StepOutOfOrder {
                    index,
                    at: step.at(),
                });
            }
            previous = step.at();
        }

        let clock = Rc::new(ManualClock::new(config.start_time));
        let reward = Rc::new(InMemoryToken::new());
        let native = Rc::new(InMemoryNative::new());
        let farm_address = Address::from_label(FARM_LABEL);
        reward.mint(&farm_address, Amount::from(config.reward_supply));
        native.mint(&farm_address, Amount::from(config.native_balance));

        let mut participants = BTreeSet::new();
        participants.insert(config.admin.clone());

        let mut env = Environment::new(
            clock.clone(),
            Address::from_label(REWARD_LABEL),
            reward.clone(),
            native.clone(),
        );
        let mut collections = BTreeMap::new();
        for declared in &config.collections {
            if collections.contains_key(&declared.name) {
                return Err(ScenarioError::DuplicateCollection(declared.name.clone()));
            }
            let collection = Rc::new(InMemoryCollection::new());
            for (owner, ids) in &declared.owners {
                participants.insert(owner.clone());
                let owner_address = Address::from_label(owner);
                for &id in ids {
                    collection.mint(id, &owner_address)?;
                }
            }
            let address = Address::from_label(&declared.name);
            env = env.with_collection(address, collection);
            collections.insert(declared.name.clone(), address);
        }

        let admin = Address::from_label(&config.admin);
        let farm = Farm::new(farm_address, admin, env);
        if !config.emission.is_empty() {
            farm.set_emission_schedule(&admin, emission_points(&config.emission))?;
        }
        for pool in &config.pools {
            let collateral = collections
                .get(&pool.collection)
                .copied()
                .ok_or_else(|| ScenarioError::UnknownCollection(pool.collection.clone()))?;
            farm.set_pool(&admin, pool.id, pool.strength, collateral)?;
        }

        tracing::info!(
            "Scenario ready: {} collection(s), {} pool(s), {} step(s), farm at {}",
            collections.len(),
            config.pools.len(),
            config.steps.len(),
            farm_address
        );

        Ok(Self {
            clock,
            reward,
            native,
            collections,
            participants,
            admin: config.admin.clone(),
            decimals: config.reward_decimals,
            farm,
        })
    }

    pub fn farm(&self) -> &Farm {
        &self.farm
    }

    /// Replay `steps` in order, moving the clock to each step's time.
    pub fn run(&mut self, steps: &[Step]) -> Vec<StepOutcome> {
        let mut outcomes = Vec::with_capacity(steps.len());
        for (index, step) in steps.iter().enumerate() {
            self.clock.set(step.at());
            let caller = self.caller_label(step).to_string();
            self.participants.insert(caller.clone());
            if let Step::Sweep { to, .. } = step {
                self.participants.insert(to.clone());
            }

            let (ok, result) = match self.apply(step) {
                Ok(summary) => (true, summary),
                Err(e) => {
                    tracing::warn!("Step {} ({}) at {} failed: {}", index, step.action(), step.at(), e);
                    (false, e.to_string())
                }
            };
            outcomes.push(StepOutcome {
                index,
                at: step.at(),
                action: step.action().to_string(),
                caller,
                ok,
                result,
            });
        }
        outcomes
    }

    pub fn report(&self, outcomes: Vec<StepOutcome>) -> Report {
        let balances = self
            .participants
            .iter()
            .map(|label| {
                let address = Address::from_label(label);
                BalanceRow {
                    label: label.clone(),
                    address: address.to_string(),
                    reward: self.tokens(self.reward.balance_of(&address)),
                    native: self.native.balance_of(&address).to_string(),
                }
            })
            .collect();

        Report {
            outcomes,
            balances,
            farm_reward_balance: self.tokens(self.farm.reward_balance()),
            invariants_hold: self.farm.invariants_hold(),
            snapshot: self.farm.snapshot(),
        }
    }

    /// Label for a known address, or its hex form.
    pub fn label_of(&self, address: &Address) -> String {
        if let Some((name, _)) = self.collections.iter().find(|(_, a)| *a == address) {
            return name.clone();
        }
        [FARM_LABEL, REWARD_LABEL]
            .into_iter()
            .map(str::to_string)
            .chain(self.participants.iter().cloned())
            .find(|label| Address::from_label(label) == *address)
            .unwrap_or_else(|| address.to_string())
    }

    /// Render raw reward units with the scenario's decimals.
    pub fn tokens(&self, units: Amount) -> String {
        Tokens::from_units(units)
            .with_decimals(self.decimals)
            .to_string()
    }

    fn caller_label<'a>(&'a self, step: &'a Step) -> &'a str {
        match step {
            Step::Deposit { staker, .. }
            | Step::Withdraw { staker, .. }
            | Step::Harvest { staker, .. } => staker,
            Step::SetPool { caller, .. }
            | Step::SetSchedule { caller, .. }
            | Step::Sweep { caller, .. } => caller.as_deref().unwrap_or(&self.admin),
        }
    }

    fn apply(&self, step: &Step) -> Result<String, ScenarioError> {
        let caller = Address::from_label(self.caller_label(step));
        match step {
            Step::Deposit { pool, ids, .. } => {
                let settlement = self.farm.deposit(&caller, *pool, ids)?;
                Ok(format!(
                    "locked {:?}, skipped {:?}, paid {}",
                    settlement.moved,
                    settlement.skipped,
                    self.tokens(settlement.reward_paid)
                ))
            }
            Step::Withdraw { pool, ids, .. } => {
                let settlement = self.farm.withdraw(&caller, *pool, ids)?;
                Ok(format!(
                    "unlocked {:?}, paid {}",
                    settlement.moved,
                    self.tokens(settlement.reward_paid)
                ))
            }
            Step::Harvest { pool, .. } => {
                let settlement = self.farm.harvest(&caller, *pool)?;
                Ok(format!("paid {}", self.tokens(settlement.reward_paid)))
            }
            Step::SetPool {
                pool,
                strength,
                collection,
                ..
            } => {
                let collateral = self
                    .collections
                    .get(collection)
                    .copied()
                    .ok_or_else(|| ScenarioError::UnknownCollection(collection.clone()))?;
                let version = self.farm.set_pool(&caller, *pool, *strength, collateral)?;
                Ok(format!("config v{}", version))
            }
            Step::SetSchedule { points, .. } => {
                let version = self
                    .farm
                    .set_emission_schedule(&caller, emission_points(points))?;
                Ok(format!("config v{}", version))
            }
            Step::Sweep {
                asset, to, amount, ..
            } => {
                let asset = asset.as_deref().unwrap_or(NATIVE_ASSET);
                let asset_address = if asset == NATIVE_ASSET {
                    Address::ZERO
                } else {
                    Address::from_label(asset)
                };
                self.farm.sweep(
                    &caller,
                    &asset_address,
                    &Address::from_label(to),
                    Amount::from(*amount),
                )?;
                Ok(format!("swept {} {} to {}", amount, asset, to))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"
        start_time = 0
        native_balance = 40
        reward_decimals = 0
        emission = [{ timestamp = 0, rate = 10 }]

        [[collections]]
        name = "apes"
        owners = { alice = [1, 2], bob = [5, 6] }

        [[pools]]
        id = 0
        strength = 1
        collection = "apes"

        [[steps]]
        action = "deposit"
        at = 0
        staker = "alice"
        pool = 0
        ids = [1]

        [[steps]]
        action = "deposit"
        at = 100
        staker = "bob"
        pool = 0
        ids = [5]

        [[steps]]
        action = "harvest"
        at = 200
        staker = "alice"
        pool = 0

        [[steps]]
        action = "deposit"
        at = 200
        staker = "alice"
        pool = 0
        ids = [2, 6]

        [[steps]]
        action = "withdraw"
        at = 300
        staker = "bob"
        pool = 0
        ids = [5]

        [[steps]]
        action = "sweep"
        at = 300
        to = "treasury"
        amount = 15

        [[steps]]
        action = "set_pool"
        at = 300
        caller = "mallory"
        pool = 0
        strength = 9
        collection = "apes"
    "#;

    fn run(toml: &str) -> (Scenario, Vec<StepOutcome>) {
        let config = ScenarioConfig::parse(toml).unwrap();
        let mut scenario = Scenario::build(&config).unwrap();
        let outcomes = scenario.run(&config.steps);
        (scenario, outcomes)
    }

    #[test]
    fn test_scenario_replay() {
        let (scenario, outcomes) = run(SCENARIO);
        let ok: Vec<bool> = outcomes.iter().map(|o| o.ok).collect();
        assert_eq!(ok, vec![true, true, true, false, true, true, false]);
        assert_eq!(outcomes[2].result, "paid 1500");
        assert_eq!(outcomes[3].result, FarmError::CannotDepositUnownedToken.to_string());
        assert_eq!(outcomes[4].result, "unlocked [5], paid 1000");
        assert_eq!(outcomes[6].result, FarmError::NotAdministrator.to_string());
        assert_eq!(outcomes[6].caller, "mallory");

        let farm = scenario.farm();
        assert_eq!(farm.total_disbursed(), 2_500);
        assert_eq!(farm.pending_reward(0, &Address::from_label("alice")).unwrap(), 500);
        assert!(farm.invariants_hold());
    }

    #[test]
    fn test_report_balances() {
        let (scenario, outcomes) = run(SCENARIO);
        let report = scenario.report(outcomes);
        let row = |label: &str| {
            report
                .balances
                .iter()
                .find(|b| b.label == label)
                .cloned()
                .unwrap()
        };
        assert_eq!(row("alice").reward, "1500");
        assert_eq!(row("bob").reward, "1000");
        assert_eq!(row("treasury").native, "15");
        assert!(report.invariants_hold);
        assert_eq!(report.snapshot.total_disbursed, 2_500);
    }

    #[test]
    fn test_labels_resolve() {
        let (scenario, _) = run(SCENARIO);
        assert_eq!(scenario.label_of(&Address::from_label("apes")), "apes");
        assert_eq!(scenario.label_of(&Address::from_label("bob")), "bob");
        assert_eq!(scenario.label_of(&Address::from_label(FARM_LABEL)), FARM_LABEL);
        let stranger = Address::from_label("stranger");
        assert_eq!(scenario.label_of(&stranger), stranger.to_string());
    }

    #[test]
    fn test_steps_must_be_ordered() {
        let toml = r#"
            [[steps]]
            action = "harvest"
            at = 10
            staker = "alice"
            pool = 0

            [[steps]]
            action = "harvest"
            at = 5
            staker = "alice"
            pool = 0
        "#;
        let config = ScenarioConfig::parse(toml).unwrap();
        assert!(matches!(
            Scenario::build(&config),
            Err(ScenarioError::StepOutOfOrder { index: 1, at: 5 })
        ));
    }

    #[test]
    fn test_pool_with_unknown_collection() {
        let toml = r#"
            emission = [{ timestamp = 0, rate = 1 }]

            [[pools]]
            id = 0
            strength = 1
            collection = "ghosts"
        "#;
        let config = ScenarioConfig::parse(toml).unwrap();
        assert!(matches!(
            Scenario::build(&config),
            Err(ScenarioError::UnknownCollection(name)) if name == "ghosts"
        ));
    }

    #[test]
    fn test_pool_without_schedule_fails_setup() {
        let toml = r#"
            [[collections]]
            name = "apes"

            [[pools]]
            id = 0
            strength = 1
            collection = "apes"
        "#;
        let config = ScenarioConfig::parse(toml).unwrap();
        assert!(matches!(
            Scenario::build(&config),
            Err(ScenarioError::Farm(FarmError::CannotAddPoolWithoutEmissionSchedule))
        ));
    }
}

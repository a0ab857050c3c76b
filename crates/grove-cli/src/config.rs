// crates/grove-cli/src/config.rs
//
// Scenario configuration for the Grove CLI.
// Loaded from a TOML file or populated with an empty default scenario.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use grove_core::{Amount, PoolId, Timestamp, TokenId};
use grove_economics::{EmissionPoint, REWARD_DECIMALS};

/// A scripted farm scenario.
///
/// Participants are named by label; each label maps to a deterministic
/// address. The farm itself is `"farm"`, the reward token `"reward"`.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioConfig {
    /// Log level used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Label of the farm administrator.
    #[serde(default = "default_admin")]
    pub admin: String,

    /// Clock value when the farm is created and initially configured.
    #[serde(default)]
    pub start_time: Timestamp,

    /// Reward-token units funded to the farm before the first step.
    #[serde(default = "default_reward_supply")]
    pub reward_supply: u64,

    /// Native currency held by the farm (sweepable).
    #[serde(default)]
    pub native_balance: u64,

    /// Decimals used when rendering reward amounts.
    #[serde(default = "default_reward_decimals")]
    pub reward_decimals: u32,

    /// Initial emission schedule. Leave empty to configure it in a step.
    #[serde(default)]
    pub emission: Vec<PointConfig>,

    /// Collateral collections and who owns which items.
    #[serde(default)]
    pub collections: Vec<CollectionConfig>,

    /// Pools configured at `start_time`, in order.
    #[serde(default)]
    pub pools: Vec<PoolConfig>,

    /// Timed actions, in non-decreasing `at` order.
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// A collateral collection and its initial owners.
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionConfig {
    pub name: String,
    /// Owner label -> item ids.
    #[serde(default)]
    pub owners: BTreeMap<String, Vec<TokenId>>,
}

/// An emission point. TOML integers are signed 64-bit, so amounts are read
/// as `u64` and widened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PointConfig {
    pub timestamp: Timestamp,
    pub rate: u64,
}

impl From<PointConfig> for EmissionPoint {
    fn from(point: PointConfig) -> Self {
        EmissionPoint::new(point.timestamp, Amount::from(point.rate))
    }
}

/// Convert configured points into engine points.
pub fn emission_points(points: &[PointConfig]) -> Vec<EmissionPoint> {
    points.iter().copied().map(EmissionPoint::from).collect()
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
    pub id: PoolId,
    pub strength: u64,
    /// Name of a collection from `collections`.
    pub collection: String,
}

/// One scripted action. `caller` defaults to the administrator.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Deposit {
        at: Timestamp,
        staker: String,
        pool: PoolId,
        ids: Vec<TokenId>,
    },
    Withdraw {
        at: Timestamp,
        staker: String,
        pool: PoolId,
        ids: Vec<TokenId>,
    },
    Harvest {
        at: Timestamp,
        staker: String,
        pool: PoolId,
    },
    SetPool {
        at: Timestamp,
        pool: PoolId,
        strength: u64,
        collection: String,
        #[serde(default)]
        caller: Option<String>,
    },
    SetSchedule {
        at: Timestamp,
        points: Vec<PointConfig>,
        #[serde(default)]
        caller: Option<String>,
    },
    /// `asset` is `"native"` (default), `"reward"`, or a token label.
    Sweep {
        at: Timestamp,
        #[serde(default)]
        asset: Option<String>,
        to: String,
        amount: u64,
        #[serde(default)]
        caller: Option<String>,
    },
}

impl Step {
    pub fn at(&self) -> Timestamp {
        match self {
            Step::Deposit { at, .. }
            | Step::Withdraw { at, .. }
            | Step::Harvest { at, .. }
            | Step::SetPool { at, .. }
            | Step::SetSchedule { at, .. }
            | Step::Sweep { at, .. } => *at,
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            Step::Deposit { .. } => "deposit",
            Step::Withdraw { .. } => "withdraw",
            Step::Harvest { .. } => "harvest",
            Step::SetPool { .. } => "set_pool",
            Step::SetSchedule { .. } => "set_schedule",
            Step::Sweep { .. } => "sweep",
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_admin() -> String {
    "admin".to_string()
}

fn default_reward_supply() -> u64 {
    1_000_000_000_000_000_000
}

fn default_reward_decimals() -> u32 {
    REWARD_DECIMALS
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            admin: default_admin(),
            start_time: 0,
            reward_supply: default_reward_supply(),
            native_balance: 0,
            reward_decimals: default_reward_decimals(),
            emission: Vec::new(),
            collections: Vec::new(),
            pools: Vec::new(),
            steps: Vec::new(),
        }
    }
}

impl ScenarioConfig {
    /// Load a scenario from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: ScenarioConfig = toml::from_str(contents)?;
        Ok(config)
    }
}

/// Resolve the scenario path: an explicit path (with `~/` expanded) or
/// `~/.grove/scenario.toml`.
pub fn resolve_path(explicit: Option<&str>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match explicit {
        Some(path) => match path.strip_prefix("~/") {
            Some(rest) => {
                let home = dirs::home_dir().ok_or("Could not determine home directory")?;
                Ok(home.join(rest))
            }
            None => Ok(PathBuf::from(path)),
        },
        None => {
            let home = dirs::home_dir().ok_or("Could not determine home directory")?;
            Ok(home.join(".grove").join("scenario.toml"))
        }
    }
}

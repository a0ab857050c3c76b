// crates/grove-economics/src/lib.rs
//
// grove-economics: the time-weighted multi-pool reward-accrual engine of the
// Grove collateral farm.
//
// Stakers lock non-fungible items into weighted pools and earn a share of a
// piecewise-constant emission schedule. Accounting is integral throughout;
// the reward-per-share accumulator is scaled by SCALE (10^12).

pub mod admin;
pub mod emission;
pub mod env;
pub mod farm;
pub mod guard;
pub mod pool;
pub mod position;
pub mod token;

// Re-export key types for ergonomic access from downstream crates.
pub use admin::AdminConfig;
pub use emission::{EmissionPoint, EmissionSchedule};
pub use env::Environment;
pub use farm::{Farm, FarmSnapshot, PoolView, PositionView, Settlement};
pub use guard::{ExecutionLock, LockToken};
pub use pool::{Pool, PoolRegistry};
pub use position::{Custodian, Position, PositionLedger};
pub use token::{scaled_share, Tokens, REWARD_DECIMALS, SCALE};

// crates/grove-economics/src/farm.rs
//
// Deposit/withdraw orchestration.
//
// Every mutating entry point follows the same shape:
//   1. take the execution lock (released on every exit path)
//   2. stage copies of the touched pool and position and compute the new
//      accounting without calling out
//   3. validate the requested items against the collection
//   4. perform collateral calls, then the reward payout; on failure undo the
//      collateral calls already made
//   5. commit the staged state
// No farm state is written before step 5, so a failure anywhere leaves pools,
// positions and totals exactly as they were.

use std::cell::RefCell;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use grove_core::{
    Address, Amount, CollaboratorError, FarmError, LockableCollateral, PoolId, Timestamp, TokenId,
};

use crate::admin::AdminConfig;
use crate::emission::EmissionPoint;
use crate::env::Environment;
use crate::guard::ExecutionLock;
use crate::pool::{Pool, PoolRegistry};
use crate::position::{Custodian, Position, PositionLedger};

/// Outcome of a deposit, withdrawal or harvest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub pool_id: PoolId,
    /// Pending reward paid to the caller.
    pub reward_paid: Amount,
    /// Items locked (deposit) or unlocked (withdraw) by this call.
    pub moved: Vec<TokenId>,
    /// Deposit items skipped because they were already locked.
    pub skipped: Vec<TokenId>,
}

/// Serializable view of a pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolView {
    pub id: PoolId,
    pub pool: Pool,
}

/// Serializable view of a position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionView {
    pub pool_id: PoolId,
    pub staker: Address,
    pub position: Position,
    pub items: Vec<TokenId>,
}

/// Point-in-time copy of the farm's accounting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmSnapshot {
    pub address: Address,
    pub administrator: Address,
    pub config_version: u64,
    pub taken_at: Timestamp,
    pub earliest_emission_time: Timestamp,
    pub total_strength: u64,
    pub total_disbursed: Amount,
    pub emission: Vec<EmissionPoint>,
    pub pools: Vec<PoolView>,
    pub positions: Vec<PositionView>,
}

impl FarmSnapshot {
    /// Pretty-printed JSON rendering.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

struct FarmState {
    config: AdminConfig,
    pools: PoolRegistry,
    ledger: PositionLedger,
    total_disbursed: Amount,
}

/// The collateral farm.
///
/// Methods take `&self`: state lives behind a `RefCell` that is never
/// borrowed across a collaborator call, and the execution lock rejects any
/// mutating call made from inside a collaborator.
pub struct Farm {
    address: Address,
    env: Environment,
    lock: ExecutionLock,
    state: RefCell<FarmState>,
}

impl Farm {
    /// Create a farm at `address`, administered by `administrator`.
    ///
    /// The farm pays rewards out of the reward-token balance held at
    /// `address`; funding it is the administrator's concern.
    pub fn new(address: Address, administrator: Address, env: Environment) -> Self {
        Self {
            address,
            env,
            lock: ExecutionLock::new(),
            state: RefCell::new(FarmState {
                config: AdminConfig::new(administrator),
                pools: PoolRegistry::new(),
                ledger: PositionLedger::new(),
                total_disbursed: 0,
            }),
        }
    }

    // -----------------------------------------------------------------------
    // Administration
    // -----------------------------------------------------------------------

    /// Replace the emission schedule wholesale.
    ///
    /// Every pool is first accrued up to now under the outgoing schedule.
    /// Returns the new configuration version.
    ///
    /// # Errors
    /// `NotAdministrator`, `CannotHaveEmptyEmissionSchedule`,
    /// `UnsortedEmissionSchedule`, `ReentrantCall`, `ArithmeticOverflow`.
    pub fn set_emission_schedule(
        &self,
        caller: &Address,
        points: Vec<EmissionPoint>,
    ) -> Result<u64, FarmError> {
        let _guard = self.lock.acquire()?;
        let now = self.env.now();

        let mut state = self.state.borrow_mut();
        state.config.ensure_administrator(caller)?;
        let schedule = AdminConfig::validate_schedule(points)?;

        let mut pools = state.pools.clone();
        pools.update_all(now, state.config.schedule())?;
        state.pools = pools;
        let version = state.config.install_schedule(schedule);

        tracing::info!(
            "Emission schedule replaced: {} point(s), earliest emission at {} (config v{})",
            state.config.schedule().points().len(),
            state.config.earliest_emission_time(),
            version
        );
        Ok(version)
    }

    /// Create a pool or replace its strength and collection.
    ///
    /// Every pool is first accrued up to now under the current weights. The
    /// configured pool's accrual restarts at `max(now, earliest emission)`.
    /// Returns the new configuration version.
    ///
    /// # Errors
    /// `NotAdministrator`, `CannotAddPoolWithoutEmissionSchedule`,
    /// `CannotChangeStakedCollateral`, `ReentrantCall`, `ArithmeticOverflow`.
    pub fn set_pool(
        &self,
        caller: &Address,
        pool_id: PoolId,
        strength: u64,
        collateral: Address,
    ) -> Result<u64, FarmError> {
        let _guard = self.lock.acquire()?;
        let now = self.env.now();

        let mut state = self.state.borrow_mut();
        state.config.ensure_administrator(caller)?;
        state.config.ensure_schedule()?;

        let floor = now.max(state.config.earliest_emission_time());
        let mut pools = state.pools.clone();
        pools.update_all(now, state.config.schedule())?;
        pools.configure(pool_id, strength, collateral, floor)?;
        state.pools = pools;
        let version = state.config.bump();

        tracing::info!(
            "Pool {} set: strength={} collateral={} total_strength={} (config v{})",
            pool_id,
            strength,
            collateral,
            state.pools.total_strength(),
            version
        );
        Ok(version)
    }

    /// Transfer native currency (`asset` = zero address) or a registered
    /// token held by the farm to `destination`.
    ///
    /// # Errors
    /// `NotAdministrator`, `SweepingTransferFailed`, `ReentrantCall`.
    pub fn sweep(
        &self,
        caller: &Address,
        asset: &Address,
        destination: &Address,
        amount: Amount,
    ) -> Result<(), FarmError> {
        let _guard = self.lock.acquire()?;
        self.state.borrow().config.ensure_administrator(caller)?;

        let result = if asset.is_zero() {
            self.env.native().send(&self.address, destination, amount)
        } else {
            let token = self
                .env
                .token(asset)
                .ok_or(FarmError::SweepingTransferFailed)?;
            token.transfer(&self.address, destination, amount)
        };
        result.map_err(|e| {
            tracing::warn!("Sweep of {} from {} failed: {}", amount, asset, e);
            FarmError::SweepingTransferFailed
        })?;

        tracing::info!("Swept {} of {} to {}", amount, asset, destination);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Staking
    // -----------------------------------------------------------------------

    /// Stake `ids` from the pool's collection into `pool_id`.
    ///
    /// Settles the caller's pending reward before the new items are counted.
    /// Items that are already locked (including duplicates within `ids`) are
    /// skipped.
    ///
    /// # Errors
    /// `CannotDepositInactivePool`, `CannotDepositUnownedToken`,
    /// `CollateralCallFailed`, `RewardTransferFailed`, `ReentrantCall`,
    /// `ArithmeticOverflow`. Nothing is changed on error.
    pub fn deposit(
        &self,
        caller: &Address,
        pool_id: PoolId,
        ids: &[TokenId],
    ) -> Result<Settlement, FarmError> {
        let _guard = self.lock.acquire()?;
        let now = self.env.now();

        let (mut pool, mut position, pending, total_disbursed) = {
            let state = self.state.borrow();
            let mut pool = state
                .pools
                .get(pool_id)
                .filter(|p| p.is_active())
                .cloned()
                .ok_or(FarmError::CannotDepositInactivePool)?;
            pool.accrue(now, state.config.schedule(), state.pools.total_strength())?;
            let position = state.ledger.position(pool_id, caller);
            let pending = settle(&position, &pool)?;
            let total_disbursed = state
                .total_disbursed
                .checked_add(pending)
                .ok_or(FarmError::ArithmeticOverflow)?;
            (pool, position, pending, total_disbursed)
        };

        let collection = self
            .env
            .collection(&pool.collateral)
            .ok_or(FarmError::CollateralCallFailed)?;

        let mut to_lock = Vec::new();
        let mut skipped = Vec::new();
        let mut seen = BTreeSet::new();
        for &id in ids {
            if !seen.insert(id) || collection.is_locked(id).map_err(collateral_failure)? {
                skipped.push(id);
                continue;
            }
            if collection.owner_of(id).map_err(collateral_failure)? != *caller {
                return Err(FarmError::CannotDepositUnownedToken);
            }
            to_lock.push(id);
        }

        let count = item_count(&to_lock)?;
        pool.add_staked(count)?;
        position.add_staked(count)?;
        position.checkpoint(pool.reward_per_share)?;

        self.set_items(collection.as_ref(), &to_lock, true)?;
        if let Err(e) = self.pay(caller, pending) {
            self.restore_items(collection.as_ref(), &to_lock, true);
            return Err(e);
        }

        let mut state = self.state.borrow_mut();
        let custodian = Custodian {
            pool_id,
            staker: *caller,
        };
        for &id in &to_lock {
            state.ledger.record_custody(pool.collateral, id, custodian);
        }
        state.ledger.put(pool_id, *caller, position);
        state.pools.replace(pool_id, pool);
        state.total_disbursed = total_disbursed;

        tracing::info!(
            "Deposit: {} staked {} item(s) into pool {} (skipped {}), paid {}",
            caller,
            to_lock.len(),
            pool_id,
            skipped.len(),
            pending
        );
        Ok(Settlement {
            pool_id,
            reward_paid: pending,
            moved: to_lock,
            skipped,
        })
    }

    /// Unstake `ids` from `pool_id`, settling pending reward first.
    ///
    /// # Errors
    /// `CannotWithdrawUnheldPosition` if any item is not held by the caller's
    /// position in this pool (or appears twice), plus `CollateralCallFailed`,
    /// `RewardTransferFailed`, `ReentrantCall`, `ArithmeticOverflow`.
    /// Nothing is changed on error.
    pub fn withdraw(
        &self,
        caller: &Address,
        pool_id: PoolId,
        ids: &[TokenId],
    ) -> Result<Settlement, FarmError> {
        let _guard = self.lock.acquire()?;
        let now = self.env.now();

        let (mut pool, mut position, pending, total_disbursed) = {
            let state = self.state.borrow();
            let mut pool = state
                .pools
                .get(pool_id)
                .cloned()
                .ok_or(FarmError::CannotWithdrawUnheldPosition)?;
            pool.accrue(now, state.config.schedule(), state.pools.total_strength())?;
            let position = state.ledger.position(pool_id, caller);
            let pending = settle(&position, &pool)?;
            let total_disbursed = state
                .total_disbursed
                .checked_add(pending)
                .ok_or(FarmError::ArithmeticOverflow)?;

            let custodian = Some(Custodian {
                pool_id,
                staker: *caller,
            });
            let mut seen = BTreeSet::new();
            for &id in ids {
                if !seen.insert(id) || state.ledger.custodian(&pool.collateral, id) != custodian {
                    return Err(FarmError::CannotWithdrawUnheldPosition);
                }
            }
            (pool, position, pending, total_disbursed)
        };

        let count = item_count(ids)?;
        position.remove_staked(count)?;
        pool.remove_staked(count)?;
        position.checkpoint(pool.reward_per_share)?;

        if ids.is_empty() {
            self.pay(caller, pending)?;
        } else {
            let collection = self
                .env
                .collection(&pool.collateral)
                .ok_or(FarmError::CollateralCallFailed)?;
            for &id in ids {
                if !collection.is_locked(id).map_err(collateral_failure)? {
                    return Err(FarmError::CannotWithdrawUnheldPosition);
                }
            }

            self.set_items(collection.as_ref(), ids, false)?;
            if let Err(e) = self.pay(caller, pending) {
                self.restore_items(collection.as_ref(), ids, false);
                return Err(e);
            }
        }

        let mut state = self.state.borrow_mut();
        for &id in ids {
            state.ledger.release_custody(&pool.collateral, id);
        }
        state.ledger.put(pool_id, *caller, position);
        state.pools.replace(pool_id, pool);
        state.total_disbursed = total_disbursed;

        tracing::info!(
            "Withdraw: {} unstaked {} item(s) from pool {}, paid {}",
            caller,
            ids.len(),
            pool_id,
            pending
        );
        Ok(Settlement {
            pool_id,
            reward_paid: pending,
            moved: ids.to_vec(),
            skipped: Vec::new(),
        })
    }

    /// Settle pending reward without moving collateral.
    ///
    /// Works for inactive pools too, so stakers are never trapped. The pool's
    /// collection is never called.
    pub fn harvest(&self, caller: &Address, pool_id: PoolId) -> Result<Settlement, FarmError> {
        self.withdraw(caller, pool_id, &[])
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    /// Tokens emitted by the schedule over `[from, to)`.
    pub fn get_total_emitted(&self, from: Timestamp, to: Timestamp) -> Result<Amount, FarmError> {
        self.state.borrow().config.schedule().total_emitted(from, to)
    }

    /// Reward the staker would receive if it settled now.
    pub fn pending_reward(&self, pool_id: PoolId, staker: &Address) -> Result<Amount, FarmError> {
        let now = self.env.now();
        let state = self.state.borrow();
        let Some(pool) = state.pools.get(pool_id) else {
            return Ok(0);
        };
        let reward_per_share =
            pool.projected_reward_per_share(now, state.config.schedule(), state.pools.total_strength())?;
        let position = state.ledger.position(pool_id, staker);
        if !position.is_staked() {
            return Ok(0);
        }
        position.pending(reward_per_share)
    }

    pub fn pool(&self, pool_id: PoolId) -> Option<Pool> {
        self.state.borrow().pools.get(pool_id).cloned()
    }

    pub fn position(&self, pool_id: PoolId, staker: &Address) -> Position {
        self.state.borrow().ledger.position(pool_id, staker)
    }

    /// Items the farm holds for `staker` in `pool_id`.
    pub fn items_held(&self, pool_id: PoolId, staker: &Address) -> Vec<TokenId> {
        let state = self.state.borrow();
        match state.pools.get(pool_id) {
            Some(pool) => state.ledger.items_held(&pool.collateral, pool_id, staker),
            None => Vec::new(),
        }
    }

    pub fn pool_ids(&self) -> Vec<PoolId> {
        self.state.borrow().pools.ids().collect()
    }

    pub fn total_strength(&self) -> u64 {
        self.state.borrow().pools.total_strength()
    }

    pub fn total_disbursed(&self) -> Amount {
        self.state.borrow().total_disbursed
    }

    pub fn earliest_emission_time(&self) -> Timestamp {
        self.state.borrow().config.earliest_emission_time()
    }

    pub fn config_version(&self) -> u64 {
        self.state.borrow().config.version()
    }

    pub fn emission_points(&self) -> Vec<EmissionPoint> {
        self.state.borrow().config.schedule().points().to_vec()
    }

    pub fn administrator(&self) -> Address {
        self.state.borrow().config.administrator()
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Reward-token balance available for payouts.
    pub fn reward_balance(&self) -> Amount {
        self.env.reward_token().balance_of(&self.address)
    }

    /// Whether the ledger agrees with the pools: each pool's staked amount
    /// equals the sum of its positions and the custody records, and the
    /// strengths sum to the total.
    pub fn invariants_hold(&self) -> bool {
        let state = self.state.borrow();
        let strength_sum: u64 = state.pools.iter().map(|(_, p)| p.strength).sum();
        strength_sum == state.pools.total_strength()
            && state.pools.iter().all(|(id, pool)| {
                let positions = state.ledger.staked_in_pool(id);
                let custody: u64 = state
                    .ledger
                    .iter()
                    .filter(|(pool_id, _, _)| *pool_id == id)
                    .map(|(_, staker, _)| {
                        state.ledger.items_held(&pool.collateral, id, &staker).len() as u64
                    })
                    .sum();
                positions == pool.amount_staked && custody == pool.amount_staked
            })
    }

    pub fn snapshot(&self) -> FarmSnapshot {
        let taken_at = self.env.now();
        let state = self.state.borrow();
        let pools = state
            .pools
            .iter()
            .map(|(id, pool)| PoolView {
                id,
                pool: pool.clone(),
            })
            .collect();
        let positions = state
            .ledger
            .iter()
            .map(|(pool_id, staker, position)| PositionView {
                pool_id,
                staker,
                position: *position,
                items: state
                    .pools
                    .get(pool_id)
                    .map(|p| state.ledger.items_held(&p.collateral, pool_id, &staker))
                    .unwrap_or_default(),
            })
            .collect();

        FarmSnapshot {
            address: self.address,
            administrator: state.config.administrator(),
            config_version: state.config.version(),
            taken_at,
            earliest_emission_time: state.config.earliest_emission_time(),
            total_strength: state.pools.total_strength(),
            total_disbursed: state.total_disbursed,
            emission: state.config.schedule().points().to_vec(),
            pools,
            positions,
        }
    }

    // -----------------------------------------------------------------------
    // Collaborator calls
    // -----------------------------------------------------------------------

    /// Set the lock flag on each item, undoing earlier items on failure.
    fn set_items(
        &self,
        collection: &dyn LockableCollateral,
        ids: &[TokenId],
        locked: bool,
    ) -> Result<(), FarmError> {
        for (done, &id) in ids.iter().enumerate() {
            if let Err(e) = collection.set_locked(&self.address, id, locked) {
                tracing::warn!(
                    "set_locked({}, {}) failed: {}; rolling back {} item(s)",
                    id,
                    locked,
                    e,
                    done
                );
                self.restore_items(collection, &ids[..done], locked);
                return Err(FarmError::CollateralCallFailed);
            }
        }
        Ok(())
    }

    /// Undo `set_items(ids, applied)`, newest first.
    fn restore_items(&self, collection: &dyn LockableCollateral, ids: &[TokenId], applied: bool) {
        for &id in ids.iter().rev() {
            if let Err(e) = collection.set_locked(&self.address, id, !applied) {
                tracing::warn!("Could not restore lock state of item {}: {}", id, e);
            }
        }
    }

    fn pay(&self, to: &Address, amount: Amount) -> Result<(), FarmError> {
        if amount == 0 {
            return Ok(());
        }
        self.env
            .reward_token()
            .transfer(&self.address, to, amount)
            .map_err(|e| {
                tracing::warn!("Reward payout of {} to {} failed: {}", amount, to, e);
                FarmError::RewardTransferFailed
            })
    }
}

/// Pending reward of `position` against an already accrued `pool`.
fn settle(position: &Position, pool: &Pool) -> Result<Amount, FarmError> {
    if position.is_staked() {
        position.pending(pool.reward_per_share)
    } else {
        Ok(0)
    }
}

fn item_count(ids: &[TokenId]) -> Result<u64, FarmError> {
    u64::try_from(ids.len()).map_err(|_| FarmError::ArithmeticOverflow)
}

fn collateral_failure(e: CollaboratorError) -> FarmError {
    tracing::warn!("Collateral query failed: {}", e);
    FarmError::CollateralCallFailed
}

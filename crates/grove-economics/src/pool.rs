// crates/grove-economics/src/pool.rs
//
// Pool registry and reward-per-share accrual.
//
// Each pool earns `strength / total_strength` of the schedule's emission. The
// emission credited to a pool is spread over its staked items through the
// scaled accumulator `reward_per_share`; a position settles by comparing the
// accumulator against its own checkpoint (see position.rs).
//
// Rounding: `emitted * strength / total_strength` is floored before scaling
// and the per-item division is floored again. The dust is never reconciled.
//
// Empty windows: if nothing is staked when a pool is updated, the window's
// emission is forfeited and only `last_reward_time` advances.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use grove_core::{Address, Amount, FarmError, PoolId, Timestamp};

use crate::emission::EmissionSchedule;
use crate::token::SCALE;

/// A weighted pool that collateral is staked into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    /// Collection whose items are staked into this pool.
    pub collateral: Address,
    /// Number of items currently staked across all positions.
    pub amount_staked: u64,
    /// Share weight of this pool. Zero means inactive.
    pub strength: u64,
    /// Accumulated reward per staked item, scaled by `SCALE`.
    pub reward_per_share: Amount,
    /// Time up to which rewards have been accrued.
    pub last_reward_time: Timestamp,
}

impl Pool {
    pub fn new(collateral: Address, strength: u64, last_reward_time: Timestamp) -> Self {
        Self {
            collateral,
            amount_staked: 0,
            strength,
            reward_per_share: 0,
            last_reward_time,
        }
    }

    /// A pool accepts deposits only while its strength is non-zero.
    pub fn is_active(&self) -> bool {
        self.strength > 0
    }

    /// Value `reward_per_share` would have if the pool were updated at `now`.
    ///
    /// Does not mutate the pool.
    pub fn projected_reward_per_share(
        &self,
        now: Timestamp,
        schedule: &EmissionSchedule,
        total_strength: u64,
    ) -> Result<Amount, FarmError> {
        if now <= self.last_reward_time || self.amount_staked == 0 {
            return Ok(self.reward_per_share);
        }

        let emitted = schedule.total_emitted(self.last_reward_time, now)?;
        let pool_reward = pool_share(emitted, self.strength, total_strength)?;
        let increment = pool_reward / Amount::from(self.amount_staked);

        self.reward_per_share
            .checked_add(increment)
            .ok_or(FarmError::ArithmeticOverflow)
    }

    /// Advance accrual to `now`.
    ///
    /// No-op when `now <= last_reward_time`. When nothing is staked only the
    /// timestamp moves.
    pub fn accrue(
        &mut self,
        now: Timestamp,
        schedule: &EmissionSchedule,
        total_strength: u64,
    ) -> Result<(), FarmError> {
        if now <= self.last_reward_time {
            return Ok(());
        }
        let reward_per_share = self.projected_reward_per_share(now, schedule, total_strength)?;
        if reward_per_share != self.reward_per_share {
            tracing::debug!(
                "Pool accrued {} -> {} over [{}, {})",
                self.reward_per_share,
                reward_per_share,
                self.last_reward_time,
                now
            );
        }
        self.reward_per_share = reward_per_share;
        self.last_reward_time = now;
        Ok(())
    }

    pub(crate) fn add_staked(&mut self, count: u64) -> Result<(), FarmError> {
        self.amount_staked = self
            .amount_staked
            .checked_add(count)
            .ok_or(FarmError::ArithmeticOverflow)?;
        Ok(())
    }

    pub(crate) fn remove_staked(&mut self, count: u64) -> Result<(), FarmError> {
        self.amount_staked = self
            .amount_staked
            .checked_sub(count)
            .ok_or(FarmError::CannotWithdrawUnheldPosition)?;
        Ok(())
    }
}

/// Scaled reward credited to a pool: `emitted * strength / total * SCALE`.
///
/// The weight division happens before scaling. A zero `total_strength`
/// credits nothing.
fn pool_share(emitted: Amount, strength: u64, total_strength: u64) -> Result<Amount, FarmError> {
    if total_strength == 0 || strength == 0 {
        return Ok(0);
    }
    emitted
        .checked_mul(Amount::from(strength))
        .map(|weighted| weighted / Amount::from(total_strength))
        .and_then(|share| share.checked_mul(SCALE))
        .ok_or(FarmError::ArithmeticOverflow)
}

/// All pools, keyed by id, plus the running sum of their strengths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolRegistry {
    pools: BTreeMap<PoolId, Pool>,
    total_strength: u64,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: PoolId) -> Option<&Pool> {
        self.pools.get(&id)
    }

    /// Sum of every pool's strength.
    pub fn total_strength(&self) -> u64 {
        self.total_strength
    }

    pub fn ids(&self) -> impl Iterator<Item = PoolId> + '_ {
        self.pools.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PoolId, &Pool)> + '_ {
        self.pools.iter().map(|(id, pool)| (*id, pool))
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Advance one pool's accrual to `now`.
    ///
    /// # Errors
    /// Propagates evaluator and overflow failures. Unknown ids are a no-op.
    pub fn update_pool(
        &mut self,
        id: PoolId,
        now: Timestamp,
        schedule: &EmissionSchedule,
    ) -> Result<(), FarmError> {
        let total_strength = self.total_strength;
        if let Some(pool) = self.pools.get_mut(&id) {
            pool.accrue(now, schedule, total_strength)?;
        }
        Ok(())
    }

    /// Advance every pool's accrual to `now`.
    pub fn update_all(&mut self, now: Timestamp, schedule: &EmissionSchedule) -> Result<(), FarmError> {
        let total_strength = self.total_strength;
        for pool in self.pools.values_mut() {
            pool.accrue(now, schedule, total_strength)?;
        }
        Ok(())
    }

    /// Create or replace a pool's weight and collection.
    ///
    /// `total_strength` moves by the strength delta. The pool's
    /// `last_reward_time` becomes `start_floor`, but never moves backwards for
    /// an existing pool. Staked amounts and the accumulator are preserved.
    ///
    /// # Errors
    /// `FarmError::CannotChangeStakedCollateral` if `collateral` differs from
    /// the pool's current collection while items are staked in it.
    pub fn configure(
        &mut self,
        id: PoolId,
        strength: u64,
        collateral: Address,
        start_floor: Timestamp,
    ) -> Result<(), FarmError> {
        if let Some(existing) = self.pools.get(&id) {
            if existing.amount_staked > 0 && existing.collateral != collateral {
                return Err(FarmError::CannotChangeStakedCollateral);
            }
        }
        let previous_strength = self.pools.get(&id).map(|p| p.strength).unwrap_or(0);
        let total_strength = self
            .total_strength
            .checked_sub(previous_strength)
            .and_then(|t| t.checked_add(strength))
            .ok_or(FarmError::ArithmeticOverflow)?;

        let pool = self
            .pools
            .entry(id)
            .or_insert_with(|| Pool::new(collateral, strength, start_floor));
        pool.strength = strength;
        pool.collateral = collateral;
        pool.last_reward_time = pool.last_reward_time.max(start_floor);

        self.total_strength = total_strength;
        Ok(())
    }

    /// Write back a staged copy of an existing pool.
    pub(crate) fn replace(&mut self, id: PoolId, pool: Pool) {
        self.pools.insert(id, pool);
    }
}

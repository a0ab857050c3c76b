// crates/grove-economics/src/position.rs
//
// Position ledger: per (pool, staker) stake records and item custody.
//
// A position's reward debt is the share of the pool accumulator already
// credited to it. Pending reward is the difference between what the current
// accumulator owes the position and that checkpoint, so settlement is O(1)
// regardless of how many accrual steps happened in between.
//
// Custody records which (pool, staker) locked each (collection, item). A
// withdrawal is only honoured for items the caller itself locked through
// the same pool.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use grove_core::{Address, Amount, FarmError, PoolId, TokenId};

use crate::token::scaled_share;

/// One staker's stake record within one pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Number of items staked.
    pub amount_staked: u64,
    /// Reward already credited: `amount_staked * reward_per_share / SCALE`
    /// as of the last settlement.
    pub reward_debt: Amount,
}

impl Position {
    /// Whether the position currently holds any items.
    pub fn is_staked(&self) -> bool {
        self.amount_staked > 0
    }

    /// Reward owed to the position at `reward_per_share` but not yet paid.
    ///
    /// # Errors
    /// `FarmError::ArithmeticOverflow` on overflow, or if the checkpoint is
    /// ahead of the accumulator (which a monotonic accumulator rules out).
    pub fn pending(&self, reward_per_share: Amount) -> Result<Amount, FarmError> {
        scaled_share(self.amount_staked, reward_per_share)?
            .checked_sub(self.reward_debt)
            .ok_or(FarmError::ArithmeticOverflow)
    }

    /// Move the checkpoint to `reward_per_share` for the current amount.
    pub fn checkpoint(&mut self, reward_per_share: Amount) -> Result<(), FarmError> {
        self.reward_debt = scaled_share(self.amount_staked, reward_per_share)?;
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

/// Who holds a locked item: the pool it was staked into and the staker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Custodian {
    pub pool_id: PoolId,
    pub staker: Address,
}

/// Every position plus the custody record of every item locked by the farm.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionLedger {
    positions: BTreeMap<(PoolId, Address), Position>,
    custody: BTreeMap<(Address, TokenId), Custodian>,
}

impl PositionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// The staker's position in a pool. Absent positions read as zero.
    pub fn position(&self, pool_id: PoolId, staker: &Address) -> Position {
        self.positions
            .get(&(pool_id, *staker))
            .copied()
            .unwrap_or_default()
    }

    /// Store a position. Positions are never deleted, only zeroed.
    pub fn put(&mut self, pool_id: PoolId, staker: Address, position: Position) {
        self.positions.insert((pool_id, staker), position);
    }

    /// All positions, ordered by pool then staker.
    pub fn iter(&self) -> impl Iterator<Item = (PoolId, Address, &Position)> + '_ {
        self.positions
            .iter()
            .map(|((pool_id, staker), position)| (*pool_id, *staker, position))
    }

    /// Sum of `amount_staked` over every position in a pool.
    pub fn staked_in_pool(&self, pool_id: PoolId) -> u64 {
        self.positions
            .iter()
            .filter(|((id, _), _)| *id == pool_id)
            .map(|(_, p)| p.amount_staked)
            .sum()
    }

    /// Who locked `(collection, id)` through the farm, if anyone.
    pub fn custodian(&self, collection: &Address, id: TokenId) -> Option<Custodian> {
        self.custody.get(&(*collection, id)).copied()
    }

    pub fn record_custody(&mut self, collection: Address, id: TokenId, custodian: Custodian) {
        self.custody.insert((collection, id), custodian);
    }

    pub fn release_custody(&mut self, collection: &Address, id: TokenId) -> Option<Custodian> {
        self.custody.remove(&(*collection, id))
    }

    /// Items held on behalf of `staker` in `pool_id`, for one collection.
    pub fn items_held(&self, collection: &Address, pool_id: PoolId, staker: &Address) -> Vec<TokenId> {
        self.custody
            .iter()
            .filter(|((c, _), holder)| {
                c == collection && holder.pool_id == pool_id && holder.staker == *staker
            })
            .map(|((_, id), _)| *id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::SCALE;

    fn alice() -> Address {
        Address::from_label("alice")
    }

    #[test]
    fn test_absent_position_is_zero() {
        let ledger = PositionLedger::new();
        let p = ledger.position(0, &alice());
        assert!(!p.is_staked());
        assert_eq!(p.reward_debt, 0);
    }

    #[test]
    fn test_pending_and_checkpoint() {
        let mut p = Position {
            amount_staked: 2,
            reward_debt: 0,
        };
        p.checkpoint(5 * SCALE).unwrap();
        assert_eq!(p.reward_debt, 10);

        // Accumulator grows by 3 tokens per item
        assert_eq!(p.pending(8 * SCALE).unwrap(), 6);
        p.checkpoint(8 * SCALE).unwrap();
        assert_eq!(p.pending(8 * SCALE).unwrap(), 0);
    }

    #[test]
    fn test_new_items_do_not_earn_past_interval() {
        let mut p = Position {
            amount_staked: 1,
            reward_debt: 0,
        };
        let acc = 100 * SCALE;
        let paid = p.pending(acc).unwrap();
        assert_eq!(paid, 100);

        p.add_staked(4).unwrap();
        p.checkpoint(acc).unwrap();
        assert_eq!(p.pending(acc).unwrap(), 0);
        assert_eq!(p.pending(acc + SCALE).unwrap(), 5);
    }

    #[test]
    fn test_checkpoint_ahead_of_accumulator_is_error() {
        let p = Position {
            amount_staked: 1,
            reward_debt: 50,
        };
        assert_eq!(p.pending(0), Err(FarmError::ArithmeticOverflow));
    }

    #[test]
    fn test_remove_more_than_held() {
        let mut p = Position {
            amount_staked: 1,
            reward_debt: 0,
        };
        assert!(p.remove_staked(1).is_ok());
        assert_eq!(p.remove_staked(1), Err(FarmError::CannotWithdrawUnheldPosition));
    }

    #[test]
    fn test_custody_records() {
        let mut ledger = PositionLedger::new();
        let apes = Address::from_label("apes");
        let holder = Custodian {
            pool_id: 3,
            staker: alice(),
        };
        ledger.record_custody(apes, 7, holder);
        ledger.record_custody(apes, 9, holder);

        assert_eq!(ledger.custodian(&apes, 7), Some(holder));
        assert_eq!(ledger.items_held(&apes, 3, &alice()), vec![7, 9]);
        assert_eq!(ledger.release_custody(&apes, 7), Some(holder));
        assert_eq!(ledger.custodian(&apes, 7), None);
    }

    #[test]
    fn test_staked_in_pool() {
        let mut ledger = PositionLedger::new();
        let bob = Address::from_label("bob");
        ledger.put(0, alice(), Position { amount_staked: 2, reward_debt: 0 });
        ledger.put(0, bob, Position { amount_staked: 3, reward_debt: 0 });
        ledger.put(1, bob, Position { amount_staked: 9, reward_debt: 0 });
        assert_eq!(ledger.staked_in_pool(0), 5);
        assert_eq!(ledger.staked_in_pool(1), 9);
        assert_eq!(ledger.staked_in_pool(2), 0);
    }
}

// crates/grove-sim/src/ledger.rs
//
// In-memory fungible balances: a token and the native currency.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use grove_core::{Address, Amount, CollaboratorError, FungibleToken, NativeCurrency};

/// Balance book shared by the token and native-currency implementations.
#[derive(Debug, Default)]
struct Balances {
    balances: RefCell<BTreeMap<Address, Amount>>,
    frozen: Cell<bool>,
}

impl Balances {
    fn balance_of(&self, owner: &Address) -> Amount {
        self.balances.borrow().get(owner).copied().unwrap_or(0)
    }

    fn mint(&self, to: &Address, amount: Amount) {
        let mut balances = self.balances.borrow_mut();
        let entry = balances.entry(*to).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    fn transfer(&self, from: &Address, to: &Address, amount: Amount) -> Result<(), CollaboratorError> {
        if self.frozen.get() {
            return Err(CollaboratorError::new("transfers are frozen"));
        }
        let mut balances = self.balances.borrow_mut();
        let available = balances.get(from).copied().unwrap_or(0);
        if available < amount {
            return Err(CollaboratorError::new(format!(
                "insufficient balance: {} has {} but needs {}",
                from, available, amount
            )));
        }
        balances.insert(*from, available - amount);
        let received = balances.get(to).copied().unwrap_or(0);
        let updated = received
            .checked_add(amount)
            .ok_or_else(|| CollaboratorError::new("balance overflow"))?;
        balances.insert(*to, updated);
        tracing::trace!("transfer {} from {} to {}", amount, from, to);
        Ok(())
    }

    fn total_supply(&self) -> Amount {
        self.balances.borrow().values().sum()
    }
}

/// An in-memory fungible token.
#[derive(Debug, Default)]
pub struct InMemoryToken {
    book: Balances,
}

impl InMemoryToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` to `to` out of thin air.
    pub fn mint(&self, to: &Address, amount: Amount) {
        self.book.mint(to, amount);
    }

    /// Make every subsequent transfer fail (or succeed again).
    pub fn set_frozen(&self, frozen: bool) {
        self.book.frozen.set(frozen);
    }

    pub fn total_supply(&self) -> Amount {
        self.book.total_supply()
    }

    /// All non-zero balances.
    pub fn holders(&self) -> Vec<(Address, Amount)> {
        self.book
            .balances
            .borrow()
            .iter()
            .filter(|(_, b)| **b > 0)
            .map(|(a, b)| (*a, *b))
            .collect()
    }
}

impl FungibleToken for InMemoryToken {
    fn balance_of(&self, owner: &Address) -> Amount {
        self.book.balance_of(owner)
    }

    fn transfer(&self, from: &Address, to: &Address, amount: Amount) -> Result<(), CollaboratorError> {
        self.book.transfer(from, to, amount)
    }
}

/// The environment's native currency, held in memory.
#[derive(Debug, Default)]
pub struct InMemoryNative {
    book: Balances,
}

impl InMemoryNative {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mint(&self, to: &Address, amount: Amount) {
        self.book.mint(to, amount);
    }

    /// Make every subsequent send fail (or succeed again).
    pub fn set_frozen(&self, frozen: bool) {
        self.book.frozen.set(frozen);
    }
}

impl NativeCurrency for InMemoryNative {
    fn balance_of(&self, owner: &Address) -> Amount {
        self.book.balance_of(owner)
    }

    fn send(&self, from: &Address, to: &Address, amount: Amount) -> Result<(), CollaboratorError> {
        self.book.transfer(from, to, amount)
    }
}

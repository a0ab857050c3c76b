// crates/grove-core/src/traits.rs
//
// Capability interfaces the farm consumes from its external collaborators.
// All calls are synchronous; a collaborator either succeeds or reports a
// `CollaboratorError`. Implementations may call back into the farm (the
// farm's execution lock rejects such re-entry).

use crate::address::Address;
use crate::error::CollaboratorError;
use crate::units::{Amount, Timestamp, TokenId};

/// A non-fungible collection whose items can be locked in place.
///
/// Implemented by grove-sim (in-memory collection).
pub trait LockableCollateral {
    /// Current owner of an item.
    fn owner_of(&self, id: TokenId) -> Result<Address, CollaboratorError>;

    /// Whether an item is currently locked.
    fn is_locked(&self, id: TokenId) -> Result<bool, CollaboratorError>;

    /// Lock or unlock an item. `locker` is the farm's own address.
    fn set_locked(&self, locker: &Address, id: TokenId, locked: bool)
        -> Result<(), CollaboratorError>;
}

/// A fungible token with balances per address.
///
/// Implemented by grove-sim (in-memory token).
pub trait FungibleToken {
    /// Balance held by `owner`.
    fn balance_of(&self, owner: &Address) -> Amount;

    /// Move `amount` from `from`'s balance to `to`.
    fn transfer(&self, from: &Address, to: &Address, amount: Amount)
        -> Result<(), CollaboratorError>;
}

/// The execution environment's native currency.
pub trait NativeCurrency {
    /// Native balance held by `owner`.
    fn balance_of(&self, owner: &Address) -> Amount;

    /// Send `amount` of native currency from `from` to `to`.
    fn send(&self, from: &Address, to: &Address, amount: Amount) -> Result<(), CollaboratorError>;
}

/// Source of "now". Treated by the farm as untrusted but monotonic.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

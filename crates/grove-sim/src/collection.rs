// crates/grove-sim/src/collection.rs
//
// An in-memory lockable non-fungible collection.
//
// Locked items stay in their owner's account but cannot be transferred. Only
// the address that locked an item may unlock it.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use grove_core::{Address, CollaboratorError, LockableCollateral, TokenId};

#[derive(Debug, Default)]
pub struct InMemoryCollection {
    owners: RefCell<BTreeMap<TokenId, Address>>,
    lockers: RefCell<BTreeMap<TokenId, Address>>,
    refuse_locking: RefCell<BTreeSet<TokenId>>,
}

impl InMemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create item `id` owned by `owner`. Re-minting an existing id is an error.
    pub fn mint(&self, id: TokenId, owner: &Address) -> Result<(), CollaboratorError> {
        let mut owners = self.owners.borrow_mut();
        if owners.contains_key(&id) {
            return Err(CollaboratorError::new(format!("item {} already exists", id)));
        }
        owners.insert(id, *owner);
        Ok(())
    }

    /// Move an unlocked item between owners.
    pub fn transfer(&self, id: TokenId, from: &Address, to: &Address) -> Result<(), CollaboratorError> {
        if self.lockers.borrow().contains_key(&id) {
            return Err(CollaboratorError::new(format!("item {} is locked", id)));
        }
        let mut owners = self.owners.borrow_mut();
        match owners.get(&id) {
            Some(owner) if owner == from => {
                owners.insert(id, *to);
                Ok(())
            }
            Some(_) => Err(CollaboratorError::new(format!("item {} not owned by sender", id))),
            None => Err(CollaboratorError::new(format!("item {} does not exist", id))),
        }
    }

    /// Make `set_locked` fail for `id`, to exercise rollback paths.
    pub fn refuse_locking(&self, id: TokenId) {
        self.refuse_locking.borrow_mut().insert(id);
    }

    /// Address that currently holds the lock on `id`.
    pub fn locker_of(&self, id: TokenId) -> Option<Address> {
        self.lockers.borrow().get(&id).copied()
    }

    pub fn locked_count(&self) -> usize {
        self.lockers.borrow().len()
    }
}

impl LockableCollateral for InMemoryCollection {
    fn owner_of(&self, id: TokenId) -> Result<Address, CollaboratorError> {
        self.owners
            .borrow()
            .get(&id)
            .copied()
            .ok_or_else(|| CollaboratorError::new(format!("item {} does not exist", id)))
    }

    fn is_locked(&self, id: TokenId) -> Result<bool, CollaboratorError> {
        if !self.owners.borrow().contains_key(&id) {
            return Err(CollaboratorError::new(format!("item {} does not exist", id)));
        }
        Ok(self.lockers.borrow().contains_key(&id))
    }

    fn set_locked(&self, locker: &Address, id: TokenId, locked: bool) -> Result<(), CollaboratorError> {
        if !self.owners.borrow().contains_key(&id) {
            return Err(CollaboratorError::new(format!("item {} does not exist", id)));
        }
        if self.refuse_locking.borrow().contains(&id) {
            return Err(CollaboratorError::new(format!("item {} refuses locking", id)));
        }

        let mut lockers = self.lockers.borrow_mut();
        if locked {
            lockers.insert(id, *locker);
        } else {
            match lockers.get(&id) {
                Some(holder) if holder != locker => {
                    return Err(CollaboratorError::new(format!(
                        "item {} is locked by another address",
                        id
                    )));
                }
                _ => {
                    lockers.remove(&id);
                }
            }
        }
        tracing::trace!("item {} locked={} by {}", id, locked, locker);
        Ok(())
    }
}

// crates/grove-economics/src/env.rs
//
// The farm's view of its execution environment: the clock, the reward
// token it pays out, the native currency, and the collections and tokens it
// can address by contract address.

use std::collections::HashMap;
use std::rc::Rc;

use grove_core::{Address, Clock, FungibleToken, LockableCollateral, NativeCurrency, Timestamp};

/// Collaborators the farm is wired to, resolved by address.
pub struct Environment {
    clock: Rc<dyn Clock>,
    reward_token_address: Address,
    reward_token: Rc<dyn FungibleToken>,
    native: Rc<dyn NativeCurrency>,
    collections: HashMap<Address, Rc<dyn LockableCollateral>>,
    tokens: HashMap<Address, Rc<dyn FungibleToken>>,
}

impl Environment {
    /// Build an environment around the reward token.
    ///
    /// The reward token is also registered as a sweepable token at
    /// `reward_token_address`.
    pub fn new(
        clock: Rc<dyn Clock>,
        reward_token_address: Address,
        reward_token: Rc<dyn FungibleToken>,
        native: Rc<dyn NativeCurrency>,
    ) -> Self {
        let mut tokens: HashMap<Address, Rc<dyn FungibleToken>> = HashMap::new();
        tokens.insert(reward_token_address, reward_token.clone());
        Self {
            clock,
            reward_token_address,
            reward_token,
            native,
            collections: HashMap::new(),
            tokens,
        }
    }

    /// Register a lockable collection at `address`.
    pub fn with_collection(mut self, address: Address, collection: Rc<dyn LockableCollateral>) -> Self {
        self.collections.insert(address, collection);
        self
    }

    /// Register an additional fungible token at `address`.
    pub fn with_token(mut self, address: Address, token: Rc<dyn FungibleToken>) -> Self {
        self.tokens.insert(address, token);
        self
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn reward_token_address(&self) -> Address {
        self.reward_token_address
    }

    pub fn reward_token(&self) -> &dyn FungibleToken {
        self.reward_token.as_ref()
    }

    pub fn native(&self) -> &dyn NativeCurrency {
        self.native.as_ref()
    }

    pub fn collection(&self, address: &Address) -> Option<Rc<dyn LockableCollateral>> {
        self.collections.get(address).cloned()
    }

    pub fn token(&self, address: &Address) -> Option<Rc<dyn FungibleToken>> {
        self.tokens.get(address).cloned()
    }
}

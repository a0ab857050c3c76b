// crates/grove-economics/src/guard.rs
//
// Execution lock guarding every mutating farm entry point.
//
// Collaborator calls (collateral locks, token transfers) may run arbitrary
// code that calls back into the farm. The lock is taken at the start of each
// mutating operation and released when the returned token is dropped, on
// success and on every error path. A nested attempt is rejected, never queued.

use std::cell::Cell;

use grove_core::FarmError;

/// Single-holder execution lock.
#[derive(Debug, Default)]
pub struct ExecutionLock {
    held: Cell<bool>,
}

impl ExecutionLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the lock for the duration of one operation.
    ///
    /// # Errors
    /// `FarmError::ReentrantCall` if an operation is already in flight.
    pub fn acquire(&self) -> Result<LockToken<'_>, FarmError> {
        if self.held.replace(true) {
            tracing::warn!("Rejected re-entrant call into the farm");
            return Err(FarmError::ReentrantCall);
        }
        Ok(LockToken { lock: self })
    }

    /// Whether an operation currently holds the lock.
    pub fn is_held(&self) -> bool {
        self.held.get()
    }
}

/// Proof of holding the `ExecutionLock`. Releases it on drop.
#[derive(Debug)]
pub struct LockToken<'a> {
    lock: &'a ExecutionLock,
}

impl Drop for LockToken<'_> {
    fn drop(&mut self) {
        self.lock.held.set(false);
    }
}

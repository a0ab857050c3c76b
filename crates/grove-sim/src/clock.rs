// crates/grove-sim/src/clock.rs

use std::cell::Cell;

use grove_core::{Clock, Timestamp};

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Timestamp>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    /// Jump to an absolute time. Moving backwards is allowed so callers can
    /// exercise the farm's handling of a misbehaving clock.
    pub fn set(&self, now: Timestamp) {
        self.now.set(now);
    }

    /// Move forward by `delta`, saturating at the maximum timestamp.
    pub fn advance(&self, delta: Timestamp) {
        self.now.set(self.now.get().saturating_add(delta));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}

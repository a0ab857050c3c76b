// crates/grove-economics/src/admin.rs
//
// Administrative configuration store.
//
// Holds the administrator identity, the emission schedule and the derived
// earliest emission time. Every accepted administrative update bumps
// `version`; rejected updates leave the store untouched.

use serde::Serialize;

use grove_core::{Address, FarmError, Timestamp};

use crate::emission::{EmissionPoint, EmissionSchedule};

/// Versioned, validated administrative configuration.
/// Serialize-only: a fresh store holds an empty schedule, which
/// `EmissionSchedule` refuses to deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminConfig {
    administrator: Address,
    schedule: EmissionSchedule,
    earliest_emission_time: Timestamp,
    version: u64,
}

impl AdminConfig {
    /// A fresh store with no emission schedule.
    pub fn new(administrator: Address) -> Self {
        Self {
            administrator,
            schedule: EmissionSchedule::default(),
            earliest_emission_time: 0,
            version: 0,
        }
    }

    pub fn administrator(&self) -> Address {
        self.administrator
    }

    pub fn schedule(&self) -> &EmissionSchedule {
        &self.schedule
    }

    /// Minimum timestamp of the current schedule; the accrual floor for
    /// newly configured pools. 0 before any schedule is set.
    pub fn earliest_emission_time(&self) -> Timestamp {
        self.earliest_emission_time
    }

    /// Number of accepted administrative updates.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// # Errors
    /// `FarmError::NotAdministrator` unless `caller` is the administrator.
    pub fn ensure_administrator(&self, caller: &Address) -> Result<(), FarmError> {
        if *caller != self.administrator {
            return Err(FarmError::NotAdministrator);
        }
        Ok(())
    }

    /// # Errors
    /// `FarmError::CannotAddPoolWithoutEmissionSchedule` if no schedule is set.
    pub fn ensure_schedule(&self) -> Result<(), FarmError> {
        if self.schedule.is_empty() {
            return Err(FarmError::CannotAddPoolWithoutEmissionSchedule);
        }
        Ok(())
    }

    /// Validate `points` into a schedule without touching the store.
    pub fn validate_schedule(points: Vec<EmissionPoint>) -> Result<EmissionSchedule, FarmError> {
        EmissionSchedule::new(points)
    }

    /// Install a validated schedule and recompute the earliest emission time.
    ///
    /// Returns the new version.
    pub fn install_schedule(&mut self, schedule: EmissionSchedule) -> u64 {
        self.earliest_emission_time = schedule.earliest().unwrap_or(0);
        self.schedule = schedule;
        self.bump()
    }

    /// Record an accepted update that does not touch the schedule.
    pub fn bump(&mut self) -> u64 {
        self.version += 1;
        self.version
    }
}

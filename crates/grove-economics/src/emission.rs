// crates/grove-economics/src/emission.rs
//
// Piecewise-constant emission schedule.
//
// A schedule is an ordered list of (timestamp, rate) points. Each rate is in
// effect from its timestamp until the next point's timestamp; the last rate
// stays in effect forever. Before the first point nothing is emitted.
//
// Example: [(100, 10), (200, 4)]
//   [  0, 100) -> 0 tokens/s
//   [100, 200) -> 10 tokens/s
//   [200,  oo) -> 4 tokens/s

use serde::{Deserialize, Serialize};

use grove_core::{Amount, FarmError, Timestamp};

/// One breakpoint of the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmissionPoint {
    /// Time at which `rate` takes effect.
    pub timestamp: Timestamp,
    /// Tokens emitted per unit of time from `timestamp` on.
    pub rate: Amount,
}

impl EmissionPoint {
    pub fn new(timestamp: Timestamp, rate: Amount) -> Self {
        Self { timestamp, rate }
    }
}

/// A validated emission schedule with strictly ascending timestamps.
///
/// The default value is the empty schedule, which emits nothing. It is only
/// used as the state before an administrator configures emissions; every
/// schedule built through [`EmissionSchedule::new`] has at least one point.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<EmissionPoint>", into = "Vec<EmissionPoint>")]
pub struct EmissionSchedule {
    points: Vec<EmissionPoint>,
}

impl EmissionSchedule {
    /// Validate and build a schedule.
    ///
    /// # Errors
    /// - `FarmError::CannotHaveEmptyEmissionSchedule` if `points` is empty.
    /// - `FarmError::UnsortedEmissionSchedule` if timestamps are not strictly
    ///   ascending.
    pub fn new(points: Vec<EmissionPoint>) -> Result<Self, FarmError> {
        if points.is_empty() {
            return Err(FarmError::CannotHaveEmptyEmissionSchedule);
        }
        if points.windows(2).any(|w| w[0].timestamp >= w[1].timestamp) {
            return Err(FarmError::UnsortedEmissionSchedule);
        }
        Ok(Self { points })
    }

    /// The schedule's points, in ascending timestamp order.
    pub fn points(&self) -> &[EmissionPoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Minimum timestamp across all points, or `None` for the empty schedule.
    pub fn earliest(&self) -> Option<Timestamp> {
        self.points.iter().map(|p| p.timestamp).min()
    }

    /// Rate in effect at time `t` (0 before the first point).
    pub fn rate_at(&self, t: Timestamp) -> Amount {
        self.points
            .iter()
            .take_while(|p| p.timestamp <= t)
            .last()
            .map(|p| p.rate)
            .unwrap_or(0)
    }

    /// Total tokens emitted over `[from, to)`.
    ///
    /// Additive: `total_emitted(a, c) == total_emitted(a, b) + total_emitted(b, c)`
    /// for `a <= b <= c`.
    ///
    /// # Errors
    /// - `FarmError::CannotCalculateEmissions` if `to < from`.
    /// - `FarmError::ArithmeticOverflow` if the total does not fit in `Amount`.
    pub fn total_emitted(&self, from: Timestamp, to: Timestamp) -> Result<Amount, FarmError> {
        if to < from {
            return Err(FarmError::CannotCalculateEmissions);
        }

        let mut total: Amount = 0;
        let mut working_time = from;
        let mut working_rate: Amount = 0;

        for point in &self.points {
            if to < point.timestamp {
                // The rest of the schedule lies beyond `to`
                return add_segment(total, working_time, to, working_rate);
            }
            if working_time < point.timestamp {
                total = add_segment(total, working_time, point.timestamp, working_rate)?;
                working_time = point.timestamp;
            }
            working_rate = point.rate;
        }

        if working_time < to {
            total = add_segment(total, working_time, to, working_rate)?;
        }
        Ok(total)
    }
}

/// `total + (end - start) * rate`, checked. Requires `start <= end`.
fn add_segment(
    total: Amount,
    start: Timestamp,
    end: Timestamp,
    rate: Amount,
) -> Result<Amount, FarmError> {
    Amount::from(end - start)
        .checked_mul(rate)
        .and_then(|segment| total.checked_add(segment))
        .ok_or(FarmError::ArithmeticOverflow)
}

impl TryFrom<Vec<EmissionPoint>> for EmissionSchedule {
    type Error = FarmError;

    fn try_from(points: Vec<EmissionPoint>) -> Result<Self, Self::Error> {
        EmissionSchedule::new(points)
    }
}

impl From<EmissionSchedule> for Vec<EmissionPoint> {
    fn from(schedule: EmissionSchedule) -> Self {
        schedule.points
    }
}

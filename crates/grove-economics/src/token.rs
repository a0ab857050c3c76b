// crates/grove-economics/src/token.rs
//
// Reward token units and the fixed-point scale of the reward-per-share
// accumulator.
//
// Reward amounts are tracked in the token's smallest unit. The accumulator is
// scaled by SCALE (10^12) so that per-item shares of small emissions are not
// truncated to zero.

use serde::{Deserialize, Serialize};
use std::fmt;

use grove_core::{Amount, FarmError};

/// Fixed-point scale of `Pool::reward_per_share`.
pub const SCALE: Amount = 1_000_000_000_000;

/// Default number of decimals for displaying reward amounts.
pub const REWARD_DECIMALS: u32 = 18;

/// `amount * reward_per_share / SCALE`, checked.
///
/// This is the portion of the accumulator owed to `amount` staked items.
pub fn scaled_share(amount: u64, reward_per_share: Amount) -> Result<Amount, FarmError> {
    Amount::from(amount)
        .checked_mul(reward_per_share)
        .map(|v| v / SCALE)
        .ok_or(FarmError::ArithmeticOverflow)
}

/// A reward token amount paired with its display precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tokens {
    /// Amount in the token's smallest unit.
    pub units: Amount,
    /// Number of decimals used when displaying.
    pub decimals: u32,
}

impl Tokens {
    /// Create a display amount from raw units with the default decimals.
    pub fn from_units(units: Amount) -> Self {
        Self {
            units,
            decimals: REWARD_DECIMALS,
        }
    }

    /// Override the display precision.
    pub fn with_decimals(mut self, decimals: u32) -> Self {
        self.decimals = decimals;
        self
    }
}

impl fmt::Display for Tokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.decimals == 0 {
            return write!(f, "{}", self.units);
        }
        let Some(unit) = 10u128.checked_pow(self.decimals) else {
            return write!(f, "{}", self.units);
        };
        let whole = self.units / unit;
        let frac = self.units % unit;
        if frac == 0 {
            write!(f, "{}", whole)
        } else {
            // Trim trailing zeros from the fractional part
            let frac_str = format!("{:0width$}", frac, width = self.decimals as usize);
            let trimmed = frac_str.trim_end_matches('0');
            write!(f, "{}.{}", whole, trimmed)
        }
    }
}

// crates/grove-core/src/address.rs

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

/// A 20-byte account or contract address.
///
/// Stakers, the farm itself, collateral collections and token contracts are
/// all identified by an `Address`. The all-zero address is reserved as the
/// sentinel for the native currency when sweeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address. Used as the native-currency sentinel.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Derive a deterministic address from a human-readable label.
    ///
    /// Takes the first 20 bytes of `SHA-256(label)`. Used by scenario files
    /// and tests so that "alice" always maps to the same address.
    pub fn from_label(label: &str) -> Self {
        let digest = Sha256::digest(label.as_bytes());
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest[..20]);
        Address(bytes)
    }

    /// Whether this is the zero address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Raw address bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Error returned when parsing an `Address` from a hex string fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid address: {0}")]
pub struct ParseAddressError(pub String);

impl FromStr for Address {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.strip_prefix("0x").unwrap_or(s);
        let decoded = hex::decode(trimmed).map_err(|e| ParseAddressError(e.to_string()))?;
        let bytes: [u8; 20] = decoded
            .try_into()
            .map_err(|_| ParseAddressError("expected exactly 20 bytes".to_string()))?;
        Ok(Address(bytes))
    }
}

// crates/grove-core/src/lib.rs
//
// grove-core: Core types, errors, and collaborator traits for the Grove
// collateral farm.
//
// This is the leaf crate that all other crates in the workspace depend on.
// It defines addresses, the integer units used for accounting, the closed
// set of failure kinds, and the capability interfaces the farm consumes from
// its external collaborators (collateral collections, tokens, the clock).

pub mod address;
pub mod error;
pub mod traits;
pub mod units;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use grove_core::Address;`

pub use address::Address;
pub use error::{CollaboratorError, ErrorClass, FarmError};
pub use traits::{Clock, FungibleToken, LockableCollateral, NativeCurrency};
pub use units::{Amount, PoolId, Timestamp, TokenId};

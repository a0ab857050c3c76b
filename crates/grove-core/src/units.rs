// crates/grove-core/src/units.rs
//
// Integer units shared by every crate. All accounting is integral; there is
// no floating point anywhere on the settlement path.

/// A quantity of a fungible token (reward token or native currency), in its
/// smallest indivisible unit.
pub type Amount = u128;

/// A point in time as reported by the execution environment's clock.
pub type Timestamp = u64;

/// Identifier of a single non-fungible collateral item within its collection.
pub type TokenId = u64;

/// Numeric identifier of a pool.
pub type PoolId = u64;

// crates/grove-sim/src/lib.rs
//
// grove-sim: in-memory implementations of the collaborator traits defined in
// grove-core. Used by the integration tests and by the `grove simulate`
// command to drive a farm without an external execution environment.
//
// All types use interior mutability and are meant to be shared through `Rc`.

pub mod clock;
pub mod collection;
pub mod ledger;

pub use clock::ManualClock;
pub use collection::InMemoryCollection;
pub use ledger::{InMemoryNative, InMemoryToken};

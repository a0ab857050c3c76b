// crates/grove-cli/src/commands/mod.rs
//
// Command module declarations for the Grove CLI.

pub mod emitted;
pub mod schedule;
pub mod simulate;

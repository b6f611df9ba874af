//! objc-xref CLI library.
//!
//! Command implementations live here (rather than in `main.rs`) so they can
//! be exercised from integration tests.

pub mod commands;

pub use commands::*;

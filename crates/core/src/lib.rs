//! objc-xref-core
//!
//! Core library for recovering method cross-references in ARM binaries that
//! carry Objective-C runtime metadata.
//!
//! Call sites in such binaries never branch to a method implementation
//! directly: they load a selector-reference cell and jump through the
//! message-send trampoline. This crate correlates the method-name table, the
//! per-method metadata records and the selector-reference cells so that each
//! load of a selector can be linked back to the implementation it dispatches to.
//!
//! All substantive logic lives here so it is fully testable and reusable from
//! multiple frontends. The analysis engine that owns segments, references,
//! mnemonics and comments is reached only through [`store::AnalysisStore`].

pub mod model;
pub mod error;
pub mod events;
pub mod logging;
pub mod store;
pub mod db;
pub mod services;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

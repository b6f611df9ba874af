//! Error and anomaly types for the cross-reference pipeline.
//!
//! Three tiers exist:
//! - [`XrefError`]: stops the whole run (missing segment, selector
//!   multiplicity, backing-store failure).
//! - [`Anomaly`]: one candidate is skipped and the run continues.
//! - Degraded conditions (symbol fallback, odd mnemonics) are only reported
//!   as events.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Address;
use crate::store::StoreError;

/// Conditions that abort a run.
#[derive(Debug, Error)]
pub enum XrefError {
    /// A required segment is absent (not an Objective-C binary, or stripped metadata).
    #[error("Required segment '{name}' not found in the analysis database")]
    MissingSegment { name: String },

    /// More than one selector-reference cell points at the same method name.
    ///
    /// The pipeline assumes one selector per name; picking one of several
    /// cells could produce misleading cross-references, so the run stops.
    #[error(
        "{} selector references point at method name 0x{name_string_address:x} ({}); \
         expected at most one per name, aborting",
        .cells.len(),
        format_addresses(.cells)
    )]
    SelectorMultiplicity { name_string_address: Address, cells: Vec<Address> },

    /// Backing-store query or mutation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Convenience result type for pipeline operations.
pub type XrefResult<T> = Result<T, XrefError>;

/// Per-candidate condition: the candidate is dropped, the run continues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anomaly {
    /// The record address of a candidate pair lies outside the `const` segment.
    ConstOutOfBounds { name_string_address: Address, record_address: Address },
    /// The name address of a candidate pair lies outside the `methname` segment.
    NameOutOfBounds { name_string_address: Address, record_address: Address },
    /// The record's words are not backed by loaded memory.
    UnreadableRecord { record_address: Address, missing: Address },
    /// The record's implementation pointer carries no usable address.
    EmptyImplementation { record_address: Address, code_ptr: u32 },
    /// The record does not point back at the name that referenced it.
    NotAMethodRecord { name_string_address: Address, name_ptr: u32 },
    /// No selector-reference cell points at the method name.
    NoSelectorReference { name_string_address: Address },
}

impl Anomaly {
    /// Short stable identifier, used for statistics keys.
    pub fn kind(&self) -> &'static str {
        match self {
            Anomaly::ConstOutOfBounds { .. } => "const_out_of_bounds",
            Anomaly::NameOutOfBounds { .. } => "name_out_of_bounds",
            Anomaly::UnreadableRecord { .. } => "unreadable_record",
            Anomaly::EmptyImplementation { .. } => "empty_implementation",
            Anomaly::NotAMethodRecord { .. } => "not_a_method_record",
            Anomaly::NoSelectorReference { .. } => "no_selector_reference",
        }
    }
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::ConstOutOfBounds { name_string_address, record_address } => write!(
                f,
                "record 0x{record_address:x} (name 0x{name_string_address:x}) is outside the const segment"
            ),
            Anomaly::NameOutOfBounds { name_string_address, record_address } => write!(
                f,
                "name 0x{name_string_address:x} (record 0x{record_address:x}) is outside the methname segment"
            ),
            Anomaly::UnreadableRecord { record_address, missing } => write!(
                f,
                "record 0x{record_address:x} cannot be read (0x{missing:x} is unmapped)"
            ),
            Anomaly::EmptyImplementation { record_address, code_ptr } => {
                write!(f, "record 0x{record_address:x} has an empty code pointer (0x{code_ptr:x})")
            }
            Anomaly::NotAMethodRecord { name_string_address, name_ptr } => write!(
                f,
                "not a method record: name 0x{name_string_address:x} but record names 0x{name_ptr:x}"
            ),
            Anomaly::NoSelectorReference { name_string_address } => write!(
                f,
                "method name 0x{name_string_address:x} has a metadata record but no selector reference"
            ),
        }
    }
}

/// Outcome of a recoverable pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict<T> {
    Accept(T),
    Skip(Anomaly),
}

impl<T> Verdict<T> {
    pub fn accepted(self) -> Option<T> {
        match self {
            Verdict::Accept(value) => Some(value),
            Verdict::Skip(_) => None,
        }
    }

    pub fn anomaly(&self) -> Option<&Anomaly> {
        match self {
            Verdict::Accept(_) => None,
            Verdict::Skip(anomaly) => Some(anomaly),
        }
    }
}

fn format_addresses(addresses: &[Address]) -> String {
    addresses.iter().map(|a| format!("0x{a:x}")).collect::<Vec<_>>().join(", ")
}

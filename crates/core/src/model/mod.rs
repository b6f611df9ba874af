//! Core data model for segments, metadata records and the per-method values
//! that flow through the cross-reference pipeline.
//!
//! Every stage hands a fully formed, immutable value to the next one:
//! [`CandidatePair`] -> [`ValidatedMethod`] -> [`SelectorBinding`] ->
//! [`MethodCandidate`].

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Virtual address inside the analyzed binary.
pub type Address = u64;

/// Size in bytes of one field of a method-description record.
pub const RECORD_WORD_SIZE: u64 = 4;

/// Marker token prefixed to every annotation this crate writes.
pub const XREF_MARKER: &str = "OBJC_XREF";

/// Named memory region with a half-open `[start, end)` address range.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    pub name: String,
    pub start: Address,
    pub end: Address,
}

impl Segment {
    pub fn new(name: impl Into<String>, start: Address, end: Address) -> Self {
        Self { name: name.into(), start, end }
    }

    /// True if `address` lies in `[start, end)`.
    pub fn contains(&self, address: Address) -> bool {
        self.start <= address && address < self.end
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [0x{:x}, 0x{:x})", self.name, self.start, self.end)
    }
}

/// Names of the four segments the pipeline works on.
///
/// These are fixed by compiler convention; `Default` yields the Mach-O
/// section names emitted for Objective-C binaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentNames {
    /// Method name string literals.
    pub methname: String,
    /// Method-description records (among other class metadata).
    pub const_data: String,
    /// Selector-reference cells loaded by call sites.
    pub selrefs: String,
    /// Compiled code.
    pub text: String,
}

impl Default for SegmentNames {
    fn default() -> Self {
        Self {
            methname: "__objc_methname".to_string(),
            const_data: "__objc_const".to_string(),
            selrefs: "__objc_selrefs".to_string(),
            text: "__text".to_string(),
        }
    }
}

/// The four resolved segments, looked up once before a run starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjcSegments {
    pub methname: Segment,
    pub const_data: Segment,
    pub selrefs: Segment,
    pub text: Segment,
}

/// Raw method-description record as laid out by the compiler: three
/// consecutive little-endian 32-bit words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub record_address: Address,
    pub name_ptr: u32,
    pub type_ptr: u32,
    /// Implementation address with the low-order mode tag set.
    pub code_ptr: u32,
}

impl MetadataRecord {
    /// Implementation address with the mode tag removed (`code_ptr - 1`).
    ///
    /// Returns `None` when no usable address remains, i.e. `code_ptr - 1 < 1`.
    pub fn implementation_address(&self) -> Option<Address> {
        let address = u64::from(self.code_ptr).checked_sub(1)?;
        (address >= 1).then_some(address)
    }
}

/// Not-yet-validated pairing produced by scanning the `const` segment for
/// references to the method-name table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidatePair {
    pub name_string_address: Address,
    pub record_address: Address,
}

/// Metadata record that passed bounds, implementation and self-reference checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedMethod {
    pub name_string_address: Address,
    pub record: MetadataRecord,
    pub implementation_address: Address,
    /// Function name at the implementation, or its hex address when unknown.
    pub implementation_symbol: String,
    pub symbol_origin: SymbolOrigin,
}

/// Where a method's display name came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolOrigin {
    /// The analysis engine knows a function at the implementation address.
    FunctionName,
    /// No function is known there; the name is the hex address.
    AddressFallback,
}

/// Validated method bound to the single selector-reference cell naming it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorBinding {
    pub method: ValidatedMethod,
    pub selector_cell_address: Address,
}

/// Method with every field of the pipeline resolved, ready for emission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodCandidate {
    pub name_string_address: Address,
    pub record: MetadataRecord,
    pub implementation_address: Address,
    pub implementation_symbol: String,
    pub selector_cell_address: Address,
    pub call_sites: BTreeSet<Address>,
}

impl MethodCandidate {
    pub fn from_binding(binding: SelectorBinding, call_sites: BTreeSet<Address>) -> Self {
        let SelectorBinding { method, selector_cell_address } = binding;
        Self {
            name_string_address: method.name_string_address,
            record: method.record,
            implementation_address: method.implementation_address,
            implementation_symbol: method.implementation_symbol,
            selector_cell_address,
            call_sites,
        }
    }
}

/// Directed relationship from a call site to the implementation it dispatches to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CrossReference {
    pub from: Address,
    pub to: Address,
    pub label: String,
}

impl CrossReference {
    /// Annotation line recorded at the call site.
    pub fn annotation(&self) -> String {
        format!("{XREF_MARKER} {} 0x{:x}", self.label, self.to)
    }
}

/// Coarse instruction family derived from a mnemonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MnemonicClass {
    /// Memory-to-register loads (`LDR`, `LDR.W`, `LDRD`, ...).
    Load,
    /// Register moves (`MOV`, `MOVW`, `MOVT`, ...).
    Move,
    /// Address arithmetic (`ADD`, `ADDS`, ...).
    Add,
    Other,
}

impl MnemonicClass {
    /// Classify by case-insensitive prefix.
    pub fn classify(mnemonic: &str) -> Self {
        let upper = mnemonic.trim().to_ascii_uppercase();
        if upper.starts_with("LD") {
            MnemonicClass::Load
        } else if upper.starts_with("MOV") {
            MnemonicClass::Move
        } else if upper.starts_with("ADD") {
            MnemonicClass::Add
        } else {
            MnemonicClass::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MnemonicClass::Load => "load",
            MnemonicClass::Move => "move",
            MnemonicClass::Add => "add",
            MnemonicClass::Other => "other",
        }
    }
}

/// Render an address the way annotations and fallback symbols do.
pub fn hex_label(address: Address) -> String {
    format!("0x{address:x}")
}

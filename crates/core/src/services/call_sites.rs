//! Call-site collection.
//!
//! A selector cell is usually referenced by several instructions of the same
//! dispatch sequence (address materialization, the load itself, sometimes a
//! move). Only the load fetches the selector right before the message send,
//! so only loads become call sites.

use std::collections::BTreeSet;

use crate::error::XrefResult;
use crate::model::{Address, MethodCandidate, MnemonicClass, ObjcSegments, SelectorBinding};
use crate::services::references::references_into;
use crate::store::AnalysisStore;

/// Result of inspecting every code reference to a selector cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSiteCollection {
    pub candidate: MethodCandidate,
    /// Load-class references kept as call sites, with their mnemonics.
    pub retained: Vec<(Address, String)>,
    /// References dropped by the mnemonic filter; `None` when no instruction is decoded there.
    pub rejected: Vec<(Address, Option<String>)>,
}

/// Find the load instructions in `text` that reference the binding's selector cell.
pub fn collect_call_sites(
    store: &dyn AnalysisStore,
    segments: &ObjcSegments,
    binding: SelectorBinding,
) -> XrefResult<CallSiteCollection> {
    let mut call_sites = BTreeSet::new();
    let mut retained = Vec::new();
    let mut rejected = Vec::new();

    for site in references_into(store, binding.selector_cell_address, &segments.text)? {
        match store.mnemonic_at(site)? {
            Some(mnemonic) if is_load(&mnemonic) => {
                call_sites.insert(site);
                retained.push((site, mnemonic));
            }
            other => rejected.push((site, other)),
        }
    }

    Ok(CallSiteCollection {
        candidate: MethodCandidate::from_binding(binding, call_sites),
        retained,
        rejected,
    })
}

/// True for memory-to-register load mnemonics.
pub fn is_load(mnemonic: &str) -> bool {
    MnemonicClass::classify(mnemonic) == MnemonicClass::Load
}

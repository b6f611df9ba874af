mod common;

use objc_xref_core::model::{CandidatePair, SelectorBinding};
use objc_xref_core::services::{collect_call_sites, extract_method, is_load, resolve_selector};
use objc_xref_core::store::MemoryStore;

fn binding(store: &MemoryStore) -> SelectorBinding {
    let segments = common::objc_segments();
    let pair = CandidatePair { name_string_address: common::NAME, record_address: common::RECORD };
    let method = extract_method(store, &segments, pair).unwrap().accepted().unwrap();
    resolve_selector(store, &segments, method).unwrap().accepted().unwrap()
}

#[test]
fn only_the_load_becomes_a_call_site() {
    let store = common::scenario_store();
    let collection = collect_call_sites(&store, &common::objc_segments(), binding(&store)).unwrap();

    assert_eq!(collection.candidate.call_sites.iter().copied().collect::<Vec<_>>(), vec![common::LOAD_SITE]);
    assert_eq!(collection.retained, vec![(common::LOAD_SITE, "LDR".to_string())]);
    assert_eq!(collection.rejected, vec![(common::ADD_SITE, Some("ADD".to_string()))]);
    assert_eq!(collection.candidate.selector_cell_address, common::SELREF);
    assert_eq!(collection.candidate.implementation_address, common::IMP);
}

#[test]
fn references_outside_text_are_ignored() {
    let mut store = common::scenario_store();
    // A load-looking reference from a data segment is not a call site.
    common::add_code_ref(&mut store, 0x2080, common::SELREF, "LDR");
    let collection = collect_call_sites(&store, &common::objc_segments(), binding(&store)).unwrap();

    assert_eq!(collection.candidate.call_sites.len(), 1);
    assert!(!collection.candidate.call_sites.contains(&0x2080));
}

#[test]
fn undecoded_and_variant_loads() {
    let mut store = common::scenario_store();
    common::add_code_ref(&mut store, 0x6010, common::SELREF, "ldr.w");
    store.add_data_ref(0x6020, common::SELREF);
    let collection = collect_call_sites(&store, &common::objc_segments(), binding(&store)).unwrap();

    assert_eq!(
        collection.candidate.call_sites.iter().copied().collect::<Vec<_>>(),
        vec![common::LOAD_SITE, 0x6010]
    );
    assert!(collection.rejected.contains(&(0x6020, None)));
}

#[test]
fn no_code_references_gives_empty_candidate() {
    let mut store = common::empty_objc_store();
    common::add_method_record(&mut store, common::NAME, common::RECORD, common::CODE_PTR);
    common::add_selref(&mut store, common::SELREF, common::NAME);
    let collection = collect_call_sites(&store, &common::objc_segments(), binding(&store)).unwrap();

    assert!(collection.candidate.call_sites.is_empty());
    assert!(collection.retained.is_empty());
    assert!(collection.rejected.is_empty());
}

#[test]
fn load_mnemonics() {
    assert!(is_load("LDR"));
    assert!(is_load("ldrd"));
    assert!(!is_load("MOVW"));
    assert!(!is_load("ADD"));
    assert!(!is_load("BL"));
}

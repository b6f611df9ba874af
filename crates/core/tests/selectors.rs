mod common;

use objc_xref_core::error::{Anomaly, Verdict, XrefError};
use objc_xref_core::model::{CandidatePair, ValidatedMethod};
use objc_xref_core::services::{extract_method, resolve_selector};
use objc_xref_core::store::MemoryStore;

fn validated(store: &MemoryStore) -> ValidatedMethod {
    let pair = CandidatePair { name_string_address: common::NAME, record_address: common::RECORD };
    extract_method(store, &common::objc_segments(), pair)
        .expect("extract")
        .accepted()
        .expect("accepted")
}

#[test]
fn single_selector_cell_is_bound() {
    let store = common::scenario_store();
    let method = validated(&store);

    let binding = resolve_selector(&store, &common::objc_segments(), method.clone())
        .expect("resolve")
        .accepted()
        .expect("bound");
    assert_eq!(binding.selector_cell_address, common::SELREF);
    assert_eq!(binding.method, method);
}

#[test]
fn missing_selector_cell_skips_method() {
    let mut store = common::empty_objc_store();
    common::add_method_record(&mut store, common::NAME, common::RECORD, common::CODE_PTR);
    // A reference from outside selrefs does not count.
    store.add_data_ref(0x8000, common::NAME);
    let method = validated(&store);

    let verdict = resolve_selector(&store, &common::objc_segments(), method).expect("resolve");
    assert_eq!(verdict, Verdict::Skip(Anomaly::NoSelectorReference { name_string_address: common::NAME }));
}

#[test]
fn two_selector_cells_are_fatal() {
    let mut store = common::scenario_store();
    common::add_selref(&mut store, 0x5004, common::NAME);
    let method = validated(&store);

    match resolve_selector(&store, &common::objc_segments(), method) {
        Err(XrefError::SelectorMultiplicity { name_string_address, cells }) => {
            assert_eq!(name_string_address, common::NAME);
            assert_eq!(cells, vec![common::SELREF, 0x5004]);
        }
        other => panic!("expected SelectorMultiplicity, got {other:?}"),
    }
}

#[test]
fn multiplicity_error_message_names_the_cells() {
    let err = XrefError::SelectorMultiplicity { name_string_address: 0x1000, cells: vec![0x5000, 0x5004] };
    let msg = err.to_string();
    assert!(msg.contains("0x1000"), "{msg}");
    assert!(msg.contains("0x5000, 0x5004"), "{msg}");
}

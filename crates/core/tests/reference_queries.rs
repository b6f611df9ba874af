mod common;

use objc_xref_core::model::Segment;
use objc_xref_core::services::{references_into, references_into_segment};
use objc_xref_core::store::MemoryStore;

#[test]
fn references_into_keeps_only_referrers_inside_target() {
    let mut store = MemoryStore::new();
    store
        .add_data_ref(0x2000, 0x1000)
        .add_data_ref(0x20fc, 0x1000)
        .add_data_ref(0x2100, 0x1000) // one past the end
        .add_data_ref(0x5000, 0x1000);
    let target = Segment::new("__objc_const", 0x2000, 0x2100);

    let refs = references_into(&store, 0x1000, &target).expect("query");
    assert_eq!(refs.into_iter().collect::<Vec<_>>(), vec![0x2000, 0x20fc]);
}

#[test]
fn references_into_is_empty_without_edges() {
    let store = MemoryStore::new();
    let target = Segment::new("__objc_const", 0x2000, 0x2100);
    assert!(references_into(&store, 0x1000, &target).expect("query").is_empty());
}

#[test]
fn segment_scan_walks_heads_in_address_order() {
    let mut store = MemoryStore::new();
    store
        .add_head(0x1010)
        .add_head(0x1000)
        .add_head(0x1020) // no references
        .add_head(0x3000) // outside source
        .add_data_ref(0x2018, 0x1010)
        .add_data_ref(0x200c, 0x1000)
        .add_data_ref(0x2000, 0x1000)
        .add_data_ref(0x2000, 0x3000)
        .add_data_ref(0x9000, 0x1010); // outside target
    let source = Segment::new("__objc_methname", 0x1000, 0x1100);
    let target = Segment::new("__objc_const", 0x2000, 0x2100);

    let pairs = references_into_segment(&store, &source, &target).expect("scan");
    assert_eq!(pairs, vec![(0x1000, 0x2000), (0x1000, 0x200c), (0x1010, 0x2018)]);
}

#[test]
fn segment_scan_is_repeatable() {
    let store = common::scenario_store();
    let segments = common::objc_segments();
    let first = references_into_segment(&store, &segments.methname, &segments.const_data).unwrap();
    let second = references_into_segment(&store, &segments.methname, &segments.const_data).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, vec![(common::NAME, common::RECORD)]);
}

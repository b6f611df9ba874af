mod common;

use objc_xref_core::error::{Anomaly, XrefError};
use objc_xref_core::events::{RecordingSink, XrefEvent};
use objc_xref_core::model::{Segment, SegmentNames};
use objc_xref_core::services::{RunAborted, RunReport, XrefRunner};
use objc_xref_core::store::{AnalysisStore, MemoryStore};

fn run(store: &mut MemoryStore) -> (Result<RunReport, RunAborted>, RecordingSink) {
    let mut sink = RecordingSink::new();
    let outcome = XrefRunner::new(store, &mut sink).run();
    (outcome, sink)
}

#[test]
fn scenario_adds_one_reference_from_the_load() {
    let mut store = common::scenario_store();
    let (outcome, sink) = run(&mut store);
    let report = outcome.expect("run succeeds");

    assert!(store.has_reference(common::LOAD_SITE, common::IMP));
    assert!(!store.has_reference(common::ADD_SITE, common::IMP));
    assert_eq!(
        store.get_comment(common::LOAD_SITE).unwrap().as_deref(),
        Some("OBJC_XREF 0x4000 0x4000")
    );
    assert_eq!(store.get_comment(common::ADD_SITE).unwrap(), None);

    assert_eq!(report.stats.candidate_pairs, 1);
    assert_eq!(report.stats.methods, 1);
    assert_eq!(report.stats.xrefs_added, 1);
    assert_eq!(report.stats.new_edges, 1);
    assert_eq!(report.stats.symbol_fallbacks, 1);
    assert_eq!(report.stats.skipped_total(), 0);
    assert_eq!(report.stats.retained_by_class.get("load"), Some(&1));
    assert_eq!(report.stats.rejected_by_class.get("add"), Some(&1));
    assert_eq!(report.stats.oddballs, 0);

    assert_eq!(report.methods.len(), 1);
    assert_eq!(report.methods[0].symbol, "0x4000");
    assert_eq!(report.methods[0].selector_cell_address, common::SELREF);
    assert_eq!(report.methods[0].call_sites, vec![common::LOAD_SITE]);

    assert_eq!(
        sink.operator_lines(),
        vec![
            "!!! no function at 0x4000, substituting address".to_string(),
            "Method: 0x4000 0x4000 - xrefs: 1".to_string(),
            "\t0x6000".to_string(),
            "xrefs added: 1".to_string(),
        ]
    );
}

#[test]
fn named_implementation_is_used_in_annotation() {
    let mut store = common::scenario_store();
    store.set_function_name(common::IMP, "-[Widget refresh]");
    store.set_comment(common::LOAD_SITE, "fetch selector").unwrap();
    let (outcome, sink) = run(&mut store);
    let report = outcome.unwrap();

    assert_eq!(report.stats.symbol_fallbacks, 0);
    assert_eq!(
        store.get_comment(common::LOAD_SITE).unwrap().as_deref(),
        Some("fetch selector\nOBJC_XREF -[Widget refresh] 0x4000")
    );
    assert_eq!(sink.operator_lines()[0], "Method: -[Widget refresh] 0x4000 - xrefs: 1");
}

#[test]
fn record_naming_another_string_adds_nothing() {
    let mut store = common::empty_objc_store();
    store
        .add_head(common::NAME)
        .add_data_ref(common::RECORD, common::NAME)
        .write_u32_le(common::RECORD, 0x1080)
        .write_u32_le(common::RECORD + 4, common::TYPE_PTR)
        .write_u32_le(common::RECORD + 8, common::CODE_PTR);
    common::add_selref(&mut store, common::SELREF, common::NAME);
    common::add_code_ref(&mut store, common::LOAD_SITE, common::SELREF, "LDR");
    let before = store.reference_count();

    let (outcome, sink) = run(&mut store);
    let report = outcome.unwrap();

    assert_eq!(store.reference_count(), before);
    assert!(store.commented_addresses().is_empty());
    assert_eq!(report.stats.methods, 0);
    assert_eq!(report.stats.skipped.get("not_a_method_record"), Some(&1));
    assert_eq!(
        sink.anomalies(),
        vec![&Anomaly::NotAMethodRecord { name_string_address: common::NAME, name_ptr: 0x1080 }]
    );
}

#[test]
fn skipped_candidates_do_not_stop_the_run() {
    let mut store = common::scenario_store();
    // Empty implementation.
    common::add_method_record(&mut store, 0x1040, 0x2020, 1);
    // Name without a selector cell.
    common::add_method_record(&mut store, 0x1080, 0x2040, 0x4101);

    let (outcome, sink) = run(&mut store);
    let report = outcome.unwrap();

    assert_eq!(report.stats.candidate_pairs, 3);
    assert_eq!(report.stats.methods, 1);
    assert_eq!(report.stats.skipped.get("empty_implementation"), Some(&1));
    assert_eq!(report.stats.skipped.get("no_selector_reference"), Some(&1));
    assert_eq!(report.stats.skipped_total(), 2);
    assert_eq!(sink.anomalies().len(), 2);
    assert!(sink.operator_lines().iter().filter(|l| l.starts_with("!!! ")).count() >= 2);
    assert!(store.has_reference(common::LOAD_SITE, common::IMP));
}

#[test]
fn selector_multiplicity_aborts_before_later_candidates() {
    let mut store = common::scenario_store();
    // Second method: two selector cells point at its name.
    common::add_method_record(&mut store, 0x1040, 0x2020, 0x4101);
    common::add_selref(&mut store, 0x5010, 0x1040);
    common::add_selref(&mut store, 0x5014, 0x1040);
    common::add_code_ref(&mut store, 0x6080, 0x5010, "LDR");
    // Third method, well formed, but scanned after the fatal one.
    common::add_method_record(&mut store, 0x1080, 0x2040, 0x4201);
    common::add_selref(&mut store, 0x5020, 0x1080);
    common::add_code_ref(&mut store, 0x6100, 0x5020, "LDR");

    let (outcome, sink) = run(&mut store);
    let aborted = outcome.expect_err("multiplicity is fatal");

    match &aborted.error {
        XrefError::SelectorMultiplicity { name_string_address, cells } => {
            assert_eq!(*name_string_address, 0x1040);
            assert_eq!(cells, &vec![0x5010, 0x5014]);
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(aborted.report.stats.methods, 1);
    assert_eq!(aborted.report.stats.xrefs_added, 1);

    assert!(store.has_reference(common::LOAD_SITE, common::IMP));
    assert!(!store.has_reference(0x6080, 0x4100));
    assert!(!store.has_reference(0x6100, 0x4200));
    assert_eq!(store.commented_addresses(), vec![common::LOAD_SITE]);

    assert!(matches!(sink.events.last(), Some(XrefEvent::Aborted { .. })));
    let last = sink.operator_lines().pop().unwrap();
    assert!(last.starts_with("!!! aborted: 2 selector references"), "{last}");
}

#[test]
fn missing_segment_aborts_without_writes() {
    let names = SegmentNames::default();
    let mut store = MemoryStore::new();
    store
        .add_segment(Segment::new(names.methname, 0x1000, 0x1100))
        .add_segment(Segment::new(names.const_data, 0x2000, 0x2100))
        .add_segment(Segment::new(names.text, 0x6000, 0x7000));
    common::add_method_record(&mut store, common::NAME, common::RECORD, common::CODE_PTR);
    let before = store.reference_count();

    let (outcome, sink) = run(&mut store);
    let aborted = outcome.unwrap_err();

    assert!(matches!(&aborted.error, XrefError::MissingSegment { name } if name == "__objc_selrefs"));
    assert_eq!(aborted.report, RunReport::default());
    assert_eq!(store.reference_count(), before);
    assert_eq!(
        sink.operator_lines(),
        vec!["!!! aborted: Required segment '__objc_selrefs' not found in the analysis database".to_string()]
    );
}

#[test]
fn second_run_changes_nothing() {
    let mut store = common::scenario_store();
    run(&mut store).0.unwrap();
    let edges = store.reference_count();
    let comment = store.get_comment(common::LOAD_SITE).unwrap();

    let (outcome, _) = run(&mut store);
    let report = outcome.unwrap();

    assert_eq!(report.stats.xrefs_added, 1);
    assert_eq!(report.stats.new_edges, 0);
    assert_eq!(store.reference_count(), edges);
    assert_eq!(store.get_comment(common::LOAD_SITE).unwrap(), comment);
}

#[test]
fn custom_segment_names() {
    let mut store = MemoryStore::new();
    store
        .add_segment(Segment::new("meth", 0x1000, 0x1100))
        .add_segment(Segment::new("records", 0x2000, 0x2100))
        .add_segment(Segment::new("sels", 0x5000, 0x5100))
        .add_segment(Segment::new("code", 0x6000, 0x7000));
    common::add_method_record(&mut store, common::NAME, common::RECORD, common::CODE_PTR);
    common::add_selref(&mut store, common::SELREF, common::NAME);
    common::add_code_ref(&mut store, common::LOAD_SITE, common::SELREF, "LDR");

    let mut sink = RecordingSink::new();
    let mut runner = XrefRunner::new(&mut store, &mut sink);
    runner.names = SegmentNames {
        methname: "meth".into(),
        const_data: "records".into(),
        selrefs: "sels".into(),
        text: "code".into(),
    };
    let report = runner.run().unwrap();

    assert_eq!(report.stats.xrefs_added, 1);
    assert!(store.has_reference(common::LOAD_SITE, common::IMP));
}

#[test]
fn oddball_mnemonics_are_counted() {
    let mut store = common::scenario_store();
    common::add_code_ref(&mut store, 0x6008, common::SELREF, "BL");
    store.add_data_ref(0x600c, common::SELREF);
    common::add_code_ref(&mut store, 0x6010, common::SELREF, "MOVW");

    let (outcome, _) = run(&mut store);
    let stats = outcome.unwrap().stats;

    assert_eq!(stats.oddballs, 2);
    assert_eq!(stats.rejected_by_class.get("other"), Some(&2));
    assert_eq!(stats.rejected_by_class.get("move"), Some(&1));
    assert_eq!(stats.xrefs_added, 1);
}

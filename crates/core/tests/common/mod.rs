#![allow(dead_code)]

use objc_xref_core::model::{ObjcSegments, Segment, SegmentNames};
use objc_xref_core::store::MemoryStore;

pub const METHNAME: (u64, u64) = (0x1000, 0x1100);
pub const CONST: (u64, u64) = (0x2000, 0x2100);
pub const SELREFS: (u64, u64) = (0x5000, 0x5100);
pub const TEXT: (u64, u64) = (0x6000, 0x7000);

pub const NAME: u64 = 0x1000;
pub const RECORD: u64 = 0x2000;
pub const TYPE_PTR: u32 = 0x3000;
pub const CODE_PTR: u32 = 0x4001;
pub const IMP: u64 = 0x4000;
pub const SELREF: u64 = 0x5000;
pub const LOAD_SITE: u64 = 0x6000;
pub const ADD_SITE: u64 = 0x6004;

/// The four conventional segments, no contents.
pub fn empty_objc_store() -> MemoryStore {
    let names = SegmentNames::default();
    let mut store = MemoryStore::new();
    store
        .add_segment(Segment::new(names.methname, METHNAME.0, METHNAME.1))
        .add_segment(Segment::new(names.const_data, CONST.0, CONST.1))
        .add_segment(Segment::new(names.selrefs, SELREFS.0, SELREFS.1))
        .add_segment(Segment::new(names.text, TEXT.0, TEXT.1));
    store
}

pub fn objc_segments() -> ObjcSegments {
    let names = SegmentNames::default();
    ObjcSegments {
        methname: Segment::new(names.methname, METHNAME.0, METHNAME.1),
        const_data: Segment::new(names.const_data, CONST.0, CONST.1),
        selrefs: Segment::new(names.selrefs, SELREFS.0, SELREFS.1),
        text: Segment::new(names.text, TEXT.0, TEXT.1),
    }
}

/// Method record at `record` naming `name`, as the analysis engine would see it.
pub fn add_method_record(store: &mut MemoryStore, name: u64, record: u64, code_ptr: u32) {
    store
        .add_head(name)
        .add_data_ref(record, name)
        .write_u32_le(record, name as u32)
        .write_u32_le(record + 4, TYPE_PTR)
        .write_u32_le(record + 8, code_ptr);
}

/// Selector cell `cell` pointing at `name`.
pub fn add_selref(store: &mut MemoryStore, cell: u64, name: u64) {
    store.add_data_ref(cell, name).write_u32_le(cell, name as u32);
}

/// Instruction `mnemonic` at `site` referencing `cell`.
pub fn add_code_ref(store: &mut MemoryStore, site: u64, cell: u64, mnemonic: &str) {
    store.add_data_ref(site, cell).set_mnemonic(site, mnemonic);
}

/// The worked example: one method, one selector cell, a load and an add
/// referencing the cell.
pub fn scenario_store() -> MemoryStore {
    let mut store = empty_objc_store();
    add_method_record(&mut store, NAME, RECORD, CODE_PTR);
    add_selref(&mut store, SELREF, NAME);
    add_code_ref(&mut store, LOAD_SITE, SELREF, "LDR");
    add_code_ref(&mut store, ADD_SITE, SELREF, "ADD");
    store
}

//! Method-description record extraction.
//!
//! A method record in the `const` segment is three little-endian words:
//!
//! ```text
//! +0  name_ptr   -> method name literal in methname
//! +4  type_ptr   -> type encoding (carried, not interpreted)
//! +8  code_ptr   -> implementation address | 1
//! ```
//!
//! The name table is also referenced by unrelated data (runtime-owned
//! entries, class lists), so a record is only accepted when its `name_ptr`
//! points back at the name that led us to it.

use crate::error::{Anomaly, Verdict, XrefResult};
use crate::model::{
    hex_label, CandidatePair, MetadataRecord, ObjcSegments, SymbolOrigin, ValidatedMethod,
    RECORD_WORD_SIZE,
};
use crate::store::{AnalysisStore, StoreError, StoreResult};

/// Validate one `(name, record)` pair from the `methname -> const` scan.
pub fn extract_method(
    store: &dyn AnalysisStore,
    segments: &ObjcSegments,
    pair: CandidatePair,
) -> XrefResult<Verdict<ValidatedMethod>> {
    let CandidatePair { name_string_address, record_address } = pair;

    if !segments.const_data.contains(record_address) {
        return Ok(Verdict::Skip(Anomaly::ConstOutOfBounds { name_string_address, record_address }));
    }
    if !segments.methname.contains(name_string_address) {
        return Ok(Verdict::Skip(Anomaly::NameOutOfBounds { name_string_address, record_address }));
    }

    let record = match read_record(store, record_address) {
        Ok(record) => record,
        Err(StoreError::Unmapped(missing)) => {
            return Ok(Verdict::Skip(Anomaly::UnreadableRecord { record_address, missing }));
        }
        Err(err) => return Err(err.into()),
    };

    let Some(implementation_address) = record.implementation_address() else {
        return Ok(Verdict::Skip(Anomaly::EmptyImplementation {
            record_address,
            code_ptr: record.code_ptr,
        }));
    };

    let (implementation_symbol, symbol_origin) =
        match store.function_name_at(implementation_address)? {
            Some(name) if !name.is_empty() => (name, SymbolOrigin::FunctionName),
            _ => (hex_label(implementation_address), SymbolOrigin::AddressFallback),
        };

    if u64::from(record.name_ptr) != name_string_address {
        return Ok(Verdict::Skip(Anomaly::NotAMethodRecord {
            name_string_address,
            name_ptr: record.name_ptr,
        }));
    }

    Ok(Verdict::Accept(ValidatedMethod {
        name_string_address,
        record,
        implementation_address,
        implementation_symbol,
        symbol_origin,
    }))
}

/// Read the three record words at `record_address`.
pub fn read_record(
    store: &dyn AnalysisStore,
    record_address: u64,
) -> StoreResult<MetadataRecord> {
    Ok(MetadataRecord {
        record_address,
        name_ptr: store.read_u32_le(record_address)?,
        type_ptr: store.read_u32_le(record_address + RECORD_WORD_SIZE)?,
        code_ptr: store.read_u32_le(record_address + 2 * RECORD_WORD_SIZE)?,
    })
}

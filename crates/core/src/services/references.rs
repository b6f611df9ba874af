//! Segment-scoped reference queries.
//!
//! The backing store answers "who references this address"; these helpers
//! narrow that answer to referrers living in one segment. They are pure
//! queries.

use std::collections::BTreeSet;

use crate::model::{Address, Segment};
use crate::store::{AnalysisStore, StoreResult};

/// Addresses inside `target` that hold a data reference to `address`.
///
/// Referrers outside the half-open range of `target` are dropped even though
/// the edge exists.
pub fn references_into(
    store: &dyn AnalysisStore,
    address: Address,
    target: &Segment,
) -> StoreResult<BTreeSet<Address>> {
    let mut refs = store.data_references_to(address)?;
    refs.retain(|r| target.contains(*r));
    Ok(refs)
}

/// `(unit, referrer)` pairs for every analyzed unit of `source` referenced from `target`.
///
/// Units are visited in address order; referrers of one unit are ascending.
pub fn references_into_segment(
    store: &dyn AnalysisStore,
    source: &Segment,
    target: &Segment,
) -> StoreResult<Vec<(Address, Address)>> {
    let mut pairs = Vec::new();
    for unit in store.analyzed_units(source)? {
        for referrer in references_into(store, unit, target)? {
            pairs.push((unit, referrer));
        }
    }
    Ok(pairs)
}

use crate::error::{Anomaly, Verdict, XrefError, XrefResult};
use crate::model::{ObjcSegments, SelectorBinding, ValidatedMethod};
use crate::services::references::references_into;
use crate::store::AnalysisStore;

/// Bind `method` to the selector-reference cell that points at its name.
///
/// Zero cells skips the method. More than one cell is fatal: the pipeline
/// assumes one selector per name and refuses to guess.
pub fn resolve_selector(
    store: &dyn AnalysisStore,
    segments: &ObjcSegments,
    method: ValidatedMethod,
) -> XrefResult<Verdict<SelectorBinding>> {
    let cells = references_into(store, method.name_string_address, &segments.selrefs)?;

    let mut iter = cells.iter().copied();
    match (iter.next(), iter.next()) {
        (None, _) => Ok(Verdict::Skip(Anomaly::NoSelectorReference {
            name_string_address: method.name_string_address,
        })),
        (Some(selector_cell_address), None) => {
            Ok(Verdict::Accept(SelectorBinding { method, selector_cell_address }))
        }
        (Some(_), Some(_)) => Err(XrefError::SelectorMultiplicity {
            name_string_address: method.name_string_address,
            cells: cells.into_iter().collect(),
        }),
    }
}

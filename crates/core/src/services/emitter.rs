use crate::error::XrefResult;
use crate::model::{CrossReference, MethodCandidate};
use crate::store::AnalysisStore;

/// One cross-reference written by [`emit_cross_references`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedReference {
    pub reference: CrossReference,
    /// The edge did not exist before this write.
    pub new_edge: bool,
    /// The annotation line was appended (false when it was already present).
    pub annotated: bool,
}

/// Record `call site -> implementation` for every call site of `candidate`.
///
/// Each site gets a read-class data reference plus an annotation line
/// appended to its existing comment. Writes are not transactional: an error
/// leaves earlier writes in place.
pub fn emit_cross_references(
    store: &mut dyn AnalysisStore,
    candidate: &MethodCandidate,
) -> XrefResult<Vec<EmittedReference>> {
    let mut emitted = Vec::with_capacity(candidate.call_sites.len());

    for &site in &candidate.call_sites {
        let reference = CrossReference {
            from: site,
            to: candidate.implementation_address,
            label: candidate.implementation_symbol.clone(),
        };
        let new_edge = store.add_reference(reference.from, reference.to)?;

        let existing = store.get_comment(site)?;
        let annotated = match append_annotation(existing.as_deref(), &reference.annotation()) {
            Some(text) => {
                store.set_comment(site, &text)?;
                true
            }
            None => false,
        };

        emitted.push(EmittedReference { reference, new_edge, annotated });
    }

    Ok(emitted)
}

/// Comment text with `line` appended below `existing`.
///
/// Returns `None` if `existing` already contains `line` as a full line.
pub fn append_annotation(existing: Option<&str>, line: &str) -> Option<String> {
    match existing {
        Some(text) if text.lines().any(|l| l == line) => None,
        Some(text) if !text.is_empty() => Some(format!("{text}\n{line}")),
        _ => Some(line.to_string()),
    }
}

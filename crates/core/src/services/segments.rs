use std::collections::HashMap;

use crate::error::{XrefError, XrefResult};
use crate::model::{ObjcSegments, Segment, SegmentNames};
use crate::store::AnalysisStore;

/// Name -> segment lookup table, built once per run.
#[derive(Debug, Clone, Default)]
pub struct SegmentIndex {
    segments: HashMap<String, Segment>,
}

impl SegmentIndex {
    /// Snapshot the store's segment list.
    pub fn build(store: &dyn AnalysisStore) -> XrefResult<Self> {
        Ok(Self::from_segments(store.list_segments()?))
    }

    /// Index `segments` by name; the first segment wins when names repeat.
    pub fn from_segments(segments: impl IntoIterator<Item = Segment>) -> Self {
        let mut map = HashMap::new();
        for segment in segments {
            map.entry(segment.name.clone()).or_insert(segment);
        }
        Self { segments: map }
    }

    pub fn resolve(&self, name: &str) -> XrefResult<Segment> {
        self.segments
            .get(name)
            .cloned()
            .ok_or_else(|| XrefError::MissingSegment { name: name.to_string() })
    }

    /// Resolve all four required segments, failing on the first missing one.
    pub fn resolve_all(&self, names: &SegmentNames) -> XrefResult<ObjcSegments> {
        Ok(ObjcSegments {
            methname: self.resolve(&names.methname)?,
            const_data: self.resolve(&names.const_data)?,
            selrefs: self.resolve(&names.selrefs)?,
            text: self.resolve(&names.text)?,
        })
    }

    /// Sorted segment names, for error messages and diagnostics.
    pub fn names(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.segments.keys().cloned().collect();
        keys.sort();
        keys
    }
}

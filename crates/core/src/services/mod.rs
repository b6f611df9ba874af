//! Cross-reference pipeline stages and the run driver that chains them.
//!
//! Stages, in data-flow order:
//! - [`segments`]: resolve the four Objective-C segments.
//! - [`references`]: segment-scoped reference queries.
//! - [`extractor`]: read and validate one method-description record.
//! - [`selectors`]: bind the method to its single selector-reference cell.
//! - [`call_sites`]: keep the load instructions that fetch the selector.
//! - [`emitter`]: write reference edges and annotations.
//! - [`runner`]: drive every candidate through the stages.

pub mod call_sites;
pub mod emitter;
pub mod extractor;
pub mod references;
pub mod runner;
pub mod segments;
pub mod selectors;

pub use call_sites::{collect_call_sites, is_load, CallSiteCollection};
pub use emitter::{append_annotation, emit_cross_references, EmittedReference};
pub use extractor::{extract_method, read_record};
pub use references::{references_into, references_into_segment};
pub use runner::{MethodSummary, RunAborted, RunReport, RunStats, XrefRunner};
pub use segments::SegmentIndex;
pub use selectors::resolve_selector;

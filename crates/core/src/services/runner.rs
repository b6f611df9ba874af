use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::error::{Anomaly, Verdict, XrefError, XrefResult};
use crate::events::{EventSink, XrefEvent};
use crate::model::{
    Address, CandidatePair, MethodCandidate, MnemonicClass, ObjcSegments, SegmentNames,
    SymbolOrigin,
};
use crate::services::call_sites::collect_call_sites;
use crate::services::emitter::emit_cross_references;
use crate::services::extractor::extract_method;
use crate::services::references::references_into_segment;
use crate::services::segments::SegmentIndex;
use crate::services::selectors::resolve_selector;
use crate::store::AnalysisStore;

/// Aggregate counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// `(name, record)` pairs produced by the `methname -> const` scan.
    pub candidate_pairs: usize,
    /// Methods that made it through every stage.
    pub methods: usize,
    /// Cross-references written (one per call site).
    pub xrefs_added: usize,
    /// Of those, edges that did not exist before the run.
    pub new_edges: usize,
    pub symbol_fallbacks: usize,
    /// Skipped candidates keyed by anomaly kind.
    pub skipped: BTreeMap<String, usize>,
    /// Retained call sites keyed by mnemonic class.
    pub retained_by_class: BTreeMap<String, usize>,
    /// Code references dropped by the mnemonic filter, keyed by mnemonic class.
    pub rejected_by_class: BTreeMap<String, usize>,
    /// Code references whose mnemonic is not a load, move or add (or is missing).
    pub oddballs: usize,
}

impl RunStats {
    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }

    fn record_skip(&mut self, anomaly: &Anomaly) {
        *self.skipped.entry(anomaly.kind().to_string()).or_default() += 1;
    }

    fn record_mnemonic(&mut self, mnemonic: Option<&str>, retained: bool) {
        let class = mnemonic.map(MnemonicClass::classify).unwrap_or(MnemonicClass::Other);
        if class == MnemonicClass::Other {
            self.oddballs += 1;
        }
        let bucket = if retained { &mut self.retained_by_class } else { &mut self.rejected_by_class };
        *bucket.entry(class.as_str().to_string()).or_default() += 1;
    }
}

/// Per-method outcome kept for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodSummary {
    pub symbol: String,
    pub implementation_address: Address,
    pub selector_cell_address: Address,
    pub call_sites: Vec<Address>,
}

impl From<&MethodCandidate> for MethodSummary {
    fn from(candidate: &MethodCandidate) -> Self {
        Self {
            symbol: candidate.implementation_symbol.clone(),
            implementation_address: candidate.implementation_address,
            selector_cell_address: candidate.selector_cell_address,
            call_sites: candidate.call_sites.iter().copied().collect(),
        }
    }
}

/// Result of a run (complete, or partial when carried by [`RunAborted`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub stats: RunStats,
    pub methods: Vec<MethodSummary>,
}

/// A fatal condition stopped the run; `report` holds what was done before it.
///
/// Writes made before the abort stay in the store.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct RunAborted {
    pub report: RunReport,
    #[source]
    pub error: XrefError,
}

/// Drives every candidate through extraction, selector resolution, call-site
/// collection and emission, in scan order.
pub struct XrefRunner<'a> {
    pub store: &'a mut dyn AnalysisStore,
    pub sink: &'a mut dyn EventSink,
    pub names: SegmentNames,
}

impl<'a> XrefRunner<'a> {
    /// Runner over the conventional Objective-C segment names.
    pub fn new(store: &'a mut dyn AnalysisStore, sink: &'a mut dyn EventSink) -> Self {
        Self { store, sink, names: SegmentNames::default() }
    }

    pub fn run(&mut self) -> Result<RunReport, RunAborted> {
        let mut report = RunReport::default();
        match self.run_all(&mut report) {
            Ok(()) => {
                self.sink.emit(&XrefEvent::Finished { xrefs_added: report.stats.xrefs_added });
                Ok(report)
            }
            Err(error) => {
                self.sink.emit(&XrefEvent::Aborted { reason: error.to_string() });
                Err(RunAborted { report, error })
            }
        }
    }

    fn run_all(&mut self, report: &mut RunReport) -> XrefResult<()> {
        let index = SegmentIndex::build(&*self.store)?;
        let segments = index.resolve_all(&self.names)?;

        let pairs = references_into_segment(&*self.store, &segments.methname, &segments.const_data)?;
        report.stats.candidate_pairs = pairs.len();
        self.sink.emit(&XrefEvent::ScanStarted { candidates: pairs.len() });

        for (name_string_address, record_address) in pairs {
            self.process(&segments, CandidatePair { name_string_address, record_address }, report)?;
        }
        Ok(())
    }

    fn process(
        &mut self,
        segments: &ObjcSegments,
        pair: CandidatePair,
        report: &mut RunReport,
    ) -> XrefResult<()> {
        let method = match extract_method(&*self.store, segments, pair)? {
            Verdict::Accept(method) => method,
            Verdict::Skip(anomaly) => {
                self.skip(pair, anomaly, report);
                return Ok(());
            }
        };
        if method.symbol_origin == SymbolOrigin::AddressFallback {
            report.stats.symbol_fallbacks += 1;
            self.sink.emit(&XrefEvent::SymbolFallback {
                implementation_address: method.implementation_address,
                label: method.implementation_symbol.clone(),
            });
        }

        let binding = match resolve_selector(&*self.store, segments, method)? {
            Verdict::Accept(binding) => binding,
            Verdict::Skip(anomaly) => {
                self.skip(pair, anomaly, report);
                return Ok(());
            }
        };

        let collection = collect_call_sites(&*self.store, segments, binding)?;
        for (_, mnemonic) in &collection.retained {
            report.stats.record_mnemonic(Some(mnemonic.as_str()), true);
        }
        for (_, mnemonic) in &collection.rejected {
            report.stats.record_mnemonic(mnemonic.as_deref(), false);
        }

        let candidate = collection.candidate;
        self.sink.emit(&XrefEvent::MethodResolved {
            symbol: candidate.implementation_symbol.clone(),
            implementation_address: candidate.implementation_address,
            selector_cell_address: candidate.selector_cell_address,
            call_sites: candidate.call_sites.len(),
        });

        for emitted in emit_cross_references(&mut *self.store, &candidate)? {
            report.stats.xrefs_added += 1;
            if emitted.new_edge {
                report.stats.new_edges += 1;
            }
            self.sink.emit(&XrefEvent::ReferenceAdded {
                reference: emitted.reference,
                new_edge: emitted.new_edge,
            });
        }

        report.stats.methods += 1;
        report.methods.push(MethodSummary::from(&candidate));
        Ok(())
    }

    fn skip(&mut self, pair: CandidatePair, anomaly: Anomaly, report: &mut RunReport) {
        report.stats.record_skip(&anomaly);
        self.sink.emit(&XrefEvent::CandidateSkipped { pair, anomaly });
    }
}

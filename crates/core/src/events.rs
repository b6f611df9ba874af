//! Diagnostic event channel.
//!
//! The pipeline never prints. Every decision worth auditing (a skipped
//! candidate, a substituted symbol, an emitted reference) is reported as an
//! [`XrefEvent`] to an [`EventSink`], so the algorithm can be tested without
//! capturing output and frontends can choose how to present it.

use serde::Serialize;

use crate::error::Anomaly;
use crate::model::{hex_label, Address, CandidatePair, CrossReference};

/// Prefix of every operator line that reports an anomaly.
pub const ANOMALY_PREFIX: &str = "!!! ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum XrefEvent {
    /// The `methname -> const` scan produced `candidates` pairs.
    ScanStarted { candidates: usize },
    /// A candidate was dropped; the run continues.
    CandidateSkipped { pair: CandidatePair, anomaly: Anomaly },
    /// No function name exists at the implementation; the hex address stands in.
    SymbolFallback { implementation_address: Address, label: String },
    /// A method made it through every stage.
    MethodResolved {
        symbol: String,
        implementation_address: Address,
        selector_cell_address: Address,
        call_sites: usize,
    },
    /// A cross-reference was written to the store.
    ReferenceAdded { reference: CrossReference, new_edge: bool },
    /// The run stopped on a fatal condition.
    Aborted { reason: String },
    /// The run finished normally.
    Finished { xrefs_added: usize },
}

impl XrefEvent {
    /// Human-facing line for the operator stream, if this event has one.
    pub fn operator_line(&self) -> Option<String> {
        match self {
            XrefEvent::ScanStarted { .. } => None,
            XrefEvent::CandidateSkipped { anomaly, .. } => {
                Some(format!("{ANOMALY_PREFIX}{anomaly}"))
            }
            XrefEvent::SymbolFallback { implementation_address, .. } => Some(format!(
                "{ANOMALY_PREFIX}no function at 0x{implementation_address:x}, substituting address"
            )),
            XrefEvent::MethodResolved { symbol, implementation_address, call_sites, .. } => {
                Some(format!("Method: {symbol} 0x{implementation_address:x} - xrefs: {call_sites}"))
            }
            XrefEvent::ReferenceAdded { reference, .. } => {
                Some(format!("\t0x{:x}", reference.from))
            }
            XrefEvent::Aborted { reason } => Some(format!("{ANOMALY_PREFIX}aborted: {reason}")),
            XrefEvent::Finished { xrefs_added } => Some(format!("xrefs added: {xrefs_added}")),
        }
    }
}

/// Receiver of pipeline events.
pub trait EventSink {
    fn emit(&mut self, event: &XrefEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &XrefEvent) {}
}

/// Forwards events to `tracing` with structured fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&mut self, event: &XrefEvent) {
        match event {
            XrefEvent::ScanStarted { candidates } => {
                tracing::info!(candidates = *candidates, "scanning method records");
            }
            XrefEvent::CandidateSkipped { pair, anomaly } => {
                tracing::warn!(
                    kind = anomaly.kind(),
                    name = %hex_label(pair.name_string_address),
                    record = %hex_label(pair.record_address),
                    "candidate skipped: {anomaly}"
                );
            }
            XrefEvent::SymbolFallback { implementation_address, label } => {
                tracing::debug!(
                    implementation = %hex_label(*implementation_address),
                    label = %label,
                    "no function name at implementation"
                );
            }
            XrefEvent::MethodResolved {
                symbol,
                implementation_address,
                selector_cell_address,
                call_sites,
            } => {
                tracing::info!(
                    symbol = %symbol,
                    implementation = %hex_label(*implementation_address),
                    selref = %hex_label(*selector_cell_address),
                    call_sites = *call_sites,
                    "method resolved"
                );
            }
            XrefEvent::ReferenceAdded { reference, new_edge } => {
                tracing::debug!(
                    from = %hex_label(reference.from),
                    to = %hex_label(reference.to),
                    label = %reference.label,
                    new_edge = *new_edge,
                    "cross-reference added"
                );
            }
            XrefEvent::Aborted { reason } => {
                tracing::error!(reason = %reason, "run aborted");
            }
            XrefEvent::Finished { xrefs_added } => {
                tracing::info!(xrefs_added = *xrefs_added, "run finished");
            }
        }
    }
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub events: Vec<XrefEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Anomalies reported so far, in order.
    pub fn anomalies(&self) -> Vec<&Anomaly> {
        self.events
            .iter()
            .filter_map(|e| match e {
                XrefEvent::CandidateSkipped { anomaly, .. } => Some(anomaly),
                _ => None,
            })
            .collect()
    }

    /// Operator lines in order, as a console frontend would print them.
    pub fn operator_lines(&self) -> Vec<String> {
        self.events.iter().filter_map(XrefEvent::operator_line).collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &XrefEvent) {
        self.events.push(event.clone());
    }
}

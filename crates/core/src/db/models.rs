use serde::{Deserialize, Serialize};

use crate::services::{RunAborted, RunReport};

/// Final status of a cross-reference run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum XrefRunStatus {
    /// Every candidate was processed.
    Succeeded,
    /// A fatal condition (missing segment, selector multiplicity) stopped the run.
    Aborted,
    /// The backing store failed mid-run.
    Failed,
}

impl XrefRunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            XrefRunStatus::Succeeded => "succeeded",
            XrefRunStatus::Aborted => "aborted",
            XrefRunStatus::Failed => "failed",
        }
    }

    /// Decode a stored status; unknown values read as `Failed`.
    pub fn from_db(value: &str) -> Self {
        match value {
            "succeeded" => XrefRunStatus::Succeeded,
            "aborted" => XrefRunStatus::Aborted,
            _ => XrefRunStatus::Failed,
        }
    }
}

/// Record describing one run of the pipeline against the database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct XrefRunRecord {
    pub status: XrefRunStatus,
    pub started_at: String,
    pub finished_at: String,
    pub candidate_pairs: u64,
    pub methods: u64,
    pub xrefs_added: u64,
    /// Fatal error message for aborted/failed runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl XrefRunRecord {
    /// Build a record from a run outcome, stamped as finishing now.
    pub fn from_outcome(started_at: String, outcome: &Result<RunReport, RunAborted>) -> Self {
        let (report, status, error) = match outcome {
            Ok(report) => (report, XrefRunStatus::Succeeded, None),
            Err(aborted) => {
                let status = match aborted.error {
                    crate::error::XrefError::Store(_) => XrefRunStatus::Failed,
                    _ => XrefRunStatus::Aborted,
                };
                (&aborted.report, status, Some(aborted.error.to_string()))
            }
        };
        Self {
            status,
            started_at,
            finished_at: crate::db::now_rfc3339(),
            candidate_pairs: report.stats.candidate_pairs as u64,
            methods: report.stats.methods as u64,
            xrefs_added: report.stats.xrefs_added as u64,
            error,
        }
    }
}

/// Record describing a snapshot imported into the database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnapshotRecord {
    /// Where the snapshot came from (usually a file path).
    pub source: String,
    /// SHA-256 of the snapshot bytes.
    pub sha256: String,
    pub imported_at: String,
}

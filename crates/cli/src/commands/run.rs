use std::path::Path;

use anyhow::{Context, Result};
use objc_xref_core::db::{now_rfc3339, open_analysis_db, XrefRunRecord, XrefRunStatus};
use objc_xref_core::services::{RunReport, XrefRunner};
use serde::Serialize;

use crate::commands::ConsoleSink;

/// JSON shape printed by `run --json`.
#[derive(Debug, Serialize)]
pub struct RunOutput<'a> {
    pub status: XrefRunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub report: &'a RunReport,
}

/// Run the cross-reference pipeline against the analysis database.
///
/// The run is recorded in the database whether it succeeds or aborts; an
/// abort is returned as an error so the process exits non-zero.
pub fn run_command(db_path: &Path, json: bool) -> Result<()> {
    let mut db = open_analysis_db(db_path)?;
    let started_at = now_rfc3339();
    tracing::info!(db = %db_path.display(), "starting cross-reference run");

    let mut sink = ConsoleSink::new(!json);
    let outcome = XrefRunner::new(&mut db, &mut sink).run();

    let record = XrefRunRecord::from_outcome(started_at, &outcome);
    let run_id =
        db.insert_xref_run(&record).context("Failed to record run in analysis database")?;
    tracing::debug!(run_id, status = record.status.as_str(), "run recorded");

    if json {
        let (report, error) = match &outcome {
            Ok(report) => (report, None),
            Err(aborted) => (&aborted.report, Some(aborted.error.to_string())),
        };
        let output = RunOutput { status: record.status, error, report };
        println!("{}", serde_json::to_string_pretty(&output)?);
    }

    match outcome {
        Ok(_) => Ok(()),
        Err(aborted) => Err(anyhow::Error::new(aborted.error)
            .context(format!("Cross-reference run {}", record.status.as_str()))),
    }
}

use std::path::Path;

use anyhow::{Context, Result};
use objc_xref_core::db::open_analysis_db;

/// List recorded runs, oldest first.
pub fn list_runs_command(db_path: &Path, json: bool) -> Result<()> {
    let db = open_analysis_db(db_path)?;
    let runs = db.list_xref_runs().context("Failed to list runs")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&runs)?);
        return Ok(());
    }

    if runs.is_empty() {
        println!("No runs recorded.");
        return Ok(());
    }

    println!("Runs:");
    for (idx, run) in runs.iter().enumerate() {
        println!(
            "  {}. [{}] candidates={} methods={} xrefs={} started={} finished={}",
            idx + 1,
            run.status.as_str(),
            run.candidate_pairs,
            run.methods,
            run.xrefs_added,
            run.started_at,
            run.finished_at
        );
        if let Some(err) = &run.error {
            println!("     error: {err}");
        }
    }
    Ok(())
}

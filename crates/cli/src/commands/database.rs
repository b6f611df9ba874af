use std::path::Path;

use anyhow::{Context, Result};
use objc_xref_core::db::{import_snapshot_file, open_analysis_db};

/// Create (or migrate) the analysis database at `db_path`.
pub fn init_db_command(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let db = open_analysis_db(db_path)?;
    let counts = db.counts().context("Failed to read analysis database")?;

    println!("Initialized analysis database:");
    println!("  Path: {}", db_path.display());
    println!("  Segments: {}", counts.segments);
    Ok(())
}

/// Import a JSON/YAML snapshot into the analysis database.
pub fn import_command(db_path: &Path, snapshot_path: &Path, json: bool) -> Result<()> {
    let db = open_analysis_db(db_path)?;
    let summary = import_snapshot_file(&db, snapshot_path)?;
    tracing::info!(
        snapshot = %snapshot_path.display(),
        snapshot_id = summary.snapshot_id,
        sha256 = %summary.sha256,
        "snapshot imported"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Imported snapshot:");
    println!("  Source: {}", snapshot_path.display());
    println!("  SHA-256: {}", summary.sha256);
    println!("  Segments: {}", summary.counts.segments);
    println!("  Heads: {}", summary.counts.heads);
    println!("  Data refs: {}", summary.counts.data_refs);
    println!("  Instructions: {}", summary.counts.instructions);
    println!("  Functions: {}", summary.counts.functions);
    Ok(())
}

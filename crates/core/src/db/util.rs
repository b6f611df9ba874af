use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use sha2::{Digest, Sha256};

use crate::db::{AnalysisDb, DbCounts};
use crate::store::{SnapshotFormat, StoreSnapshot};

/// Outcome of importing a snapshot file.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ImportSummary {
    pub snapshot_id: i64,
    pub sha256: String,
    pub counts: DbCounts,
}

/// Current UTC time as RFC 3339.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

/// Hex-encoded SHA-256 of `bytes`.
pub fn sha256_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Open (or create) the analysis database at `path`.
pub fn open_analysis_db(path: &Path) -> Result<AnalysisDb> {
    AnalysisDb::open(path)
        .with_context(|| format!("Failed to open analysis database at {}", path.display()))
}

/// Parse the snapshot at `path` (JSON or YAML by extension) and import it into `db`.
pub fn import_snapshot_file(db: &AnalysisDb, path: &Path) -> Result<ImportSummary> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read snapshot at {}", path.display()))?;
    let sha256 = sha256_bytes(&bytes);
    let snapshot = StoreSnapshot::from_bytes(&bytes, SnapshotFormat::from_path(path))
        .with_context(|| format!("Failed to load snapshot {}", path.display()))?;

    let snapshot_id = db
        .import_snapshot(&snapshot, &path.display().to_string(), &sha256, &now_rfc3339())
        .context("Failed to import snapshot into analysis database")?;
    let counts = db.counts().context("Failed to count analysis rows")?;

    Ok(ImportSummary { snapshot_id, sha256, counts })
}

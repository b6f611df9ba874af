//! SQLite analysis database.
//!
//! The database holds what the external analysis engine knows about one
//! binary (segments, heads, data references, memory, mnemonics, function
//! names, comments) and implements [`crate::store::AnalysisStore`] on top of
//! it, so the pipeline can run against a persisted database and leave its
//! cross-references and annotations there.
//!
//! It also keeps bookkeeping tables: imported snapshots and run history.

pub mod analysis_db;
pub mod models;
pub mod util;

pub use analysis_db::{AnalysisDb, DbCounts, DbError, DbResult, CURRENT_SCHEMA_VERSION};
pub use models::{SnapshotRecord, XrefRunRecord, XrefRunStatus};
pub use util::{import_snapshot_file, now_rfc3339, open_analysis_db, sha256_bytes, ImportSummary};

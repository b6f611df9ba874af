use std::collections::BTreeSet;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;

use crate::db::{SnapshotRecord, XrefRunRecord, XrefRunStatus};
use crate::model::{Address, Segment};
use crate::store::{AnalysisStore, StoreError, StoreResult, StoreSnapshot};

/// Minimum schema version we know how to handle.
///
/// `0` means "no schema yet" (fresh DB).
const MIN_SUPPORTED_SCHEMA_VERSION: i32 = 0;

/// Latest schema version this crate knows about.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Error type for analysis database operations.
#[derive(Debug, Error)]
pub enum DbError {
    /// Underlying SQLite error.
    #[error("SQLite error: {0}")]
    Sql(#[from] rusqlite::Error),

    /// The database was created with a newer schema version than we support.
    #[error(
        "Unsupported schema version {found}; supported range is {min_supported}..={max_supported}"
    )]
    UnsupportedSchemaVersion { found: i32, min_supported: i32, max_supported: i32 },
}

/// Convenience result type for DB operations.
pub type DbResult<T> = Result<T, DbError>;

/// Row counts of the analysis tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct DbCounts {
    pub segments: u64,
    pub heads: u64,
    pub data_refs: u64,
    pub memory_bytes: u64,
    pub instructions: u64,
    pub functions: u64,
    pub comments: u64,
}

/// SQLite-backed analysis database.
///
/// This is a thin wrapper around `rusqlite::Connection` that is responsible for:
/// - Opening/creating the DB file.
/// - Applying schema migrations.
/// - Serving the [`AnalysisStore`] queries and mutations.
/// - Bookkeeping for snapshot imports and runs.
#[derive(Debug)]
pub struct AnalysisDb {
    conn: Connection,
}

impl AnalysisDb {
    /// Open (or create) an analysis database at the given path and ensure the schema exists.
    pub fn open(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        apply_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Fresh database that lives only as long as the value.
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        apply_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Expose a reference to the underlying connection for advanced callers.
    /// For most code, prefer higher-level helpers.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Write every table of `snapshot` in one transaction and record the import.
    ///
    /// Existing rows for the same keys are replaced; reference edges and heads
    /// are merged.
    pub fn import_snapshot(
        &self,
        snapshot: &StoreSnapshot,
        source: &str,
        sha256: &str,
        imported_at: &str,
    ) -> DbResult<i64> {
        let tx = self.conn.unchecked_transaction()?;

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT OR REPLACE INTO segments (name, start_addr, end_addr)
                VALUES (?1, ?2, ?3)
                "#,
            )?;
            for s in &snapshot.segments {
                stmt.execute(params![s.name, s.start as i64, s.end as i64])?;
            }
        }

        {
            let mut stmt = tx.prepare("INSERT OR IGNORE INTO heads (address) VALUES (?1)")?;
            for head in &snapshot.heads {
                stmt.execute(params![*head as i64])?;
            }
        }

        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO data_refs (from_addr, to_addr) VALUES (?1, ?2)",
            )?;
            for edge in &snapshot.data_refs {
                stmt.execute(params![edge.from as i64, edge.to as i64])?;
            }
        }

        {
            let mut stmt =
                tx.prepare("INSERT OR REPLACE INTO memory (address, byte) VALUES (?1, ?2)")?;
            for (address, byte) in snapshot.memory_bytes() {
                stmt.execute(params![address as i64, byte])?;
            }
        }

        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO instructions (address, mnemonic) VALUES (?1, ?2)",
            )?;
            for insn in &snapshot.instructions {
                stmt.execute(params![insn.address as i64, insn.mnemonic])?;
            }
        }

        {
            let mut stmt =
                tx.prepare("INSERT OR REPLACE INTO functions (address, name) VALUES (?1, ?2)")?;
            for func in &snapshot.functions {
                stmt.execute(params![func.address as i64, func.name])?;
            }
        }

        {
            let mut stmt =
                tx.prepare("INSERT OR REPLACE INTO comments (address, text) VALUES (?1, ?2)")?;
            for comment in &snapshot.comments {
                stmt.execute(params![comment.address as i64, comment.text])?;
            }
        }

        tx.execute(
            r#"
            INSERT INTO snapshots (source, sha256, imported_at)
            VALUES (?1, ?2, ?3)
            "#,
            params![source, sha256, imported_at],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(id)
    }

    /// List imported snapshots (ordered by id).
    pub fn list_snapshots(&self) -> DbResult<Vec<SnapshotRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT source, sha256, imported_at
            FROM snapshots
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(SnapshotRecord { source: row.get(0)?, sha256: row.get(1)?, imported_at: row.get(2)? })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Insert a run record and return its row id.
    pub fn insert_xref_run(&self, record: &XrefRunRecord) -> DbResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO xref_runs (status, started_at, finished_at, candidate_pairs, methods, xrefs_added, error)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                record.status.as_str(),
                record.started_at,
                record.finished_at,
                record.candidate_pairs as i64,
                record.methods as i64,
                record.xrefs_added as i64,
                record.error
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// List run records (ordered by id).
    pub fn list_xref_runs(&self) -> DbResult<Vec<XrefRunRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT status, started_at, finished_at, candidate_pairs, methods, xrefs_added, error
            FROM xref_runs
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            let status: String = row.get(0)?;
            Ok(XrefRunRecord {
                status: XrefRunStatus::from_db(&status),
                started_at: row.get(1)?,
                finished_at: row.get(2)?,
                candidate_pairs: row.get::<_, i64>(3)? as u64,
                methods: row.get::<_, i64>(4)? as u64,
                xrefs_added: row.get::<_, i64>(5)? as u64,
                error: row.get(6)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Row counts of the analysis tables.
    pub fn counts(&self) -> DbResult<DbCounts> {
        let count = |table: &str| -> DbResult<u64> {
            let n: i64 =
                self.conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
            Ok(n as u64)
        };
        Ok(DbCounts {
            segments: count("segments")?,
            heads: count("heads")?,
            data_refs: count("data_refs")?,
            memory_bytes: count("memory")?,
            instructions: count("instructions")?,
            functions: count("functions")?,
            comments: count("comments")?,
        })
    }

    /// True if a reference edge `from -> to` exists.
    pub fn has_reference(&self, from: Address, to: Address) -> DbResult<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM data_refs WHERE from_addr = ?1 AND to_addr = ?2",
                params![from as i64, to as i64],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn byte_at(&self, address: Address) -> StoreResult<Option<u8>> {
        let mut stmt = self.conn.prepare_cached("SELECT byte FROM memory WHERE address = ?1")?;
        Ok(stmt.query_row(params![address as i64], |row| row.get::<_, u8>(0)).optional()?)
    }
}

impl AnalysisStore for AnalysisDb {
    fn list_segments(&self) -> StoreResult<Vec<Segment>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT name, start_addr, end_addr
            FROM segments
            ORDER BY start_addr, id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Segment {
                name: row.get(0)?,
                start: row.get::<_, i64>(1)? as u64,
                end: row.get::<_, i64>(2)? as u64,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn analyzed_units(&self, segment: &Segment) -> StoreResult<Vec<Address>> {
        let mut stmt = self.conn.prepare_cached(
            r#"
            SELECT address
            FROM heads
            WHERE address >= ?1 AND address < ?2
            ORDER BY address
            "#,
        )?;
        let rows = stmt.query_map(params![segment.start as i64, segment.end as i64], |row| {
            row.get::<_, i64>(0)
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row? as u64);
        }
        Ok(out)
    }

    fn data_references_to(&self, address: Address) -> StoreResult<BTreeSet<Address>> {
        let mut stmt =
            self.conn.prepare_cached("SELECT from_addr FROM data_refs WHERE to_addr = ?1")?;
        let rows = stmt.query_map(params![address as i64], |row| row.get::<_, i64>(0))?;

        let mut out = BTreeSet::new();
        for row in rows {
            out.insert(row? as u64);
        }
        Ok(out)
    }

    fn read_u32_le(&self, address: Address) -> StoreResult<u32> {
        let mut bytes = [0u8; 4];
        for (offset, slot) in bytes.iter_mut().enumerate() {
            let at = address + offset as u64;
            *slot = self.byte_at(at)?.ok_or(StoreError::Unmapped(at))?;
        }
        Ok(u32::from_le_bytes(bytes))
    }

    fn mnemonic_at(&self, address: Address) -> StoreResult<Option<String>> {
        let mut stmt =
            self.conn.prepare_cached("SELECT mnemonic FROM instructions WHERE address = ?1")?;
        Ok(stmt.query_row(params![address as i64], |row| row.get(0)).optional()?)
    }

    fn function_name_at(&self, address: Address) -> StoreResult<Option<String>> {
        let mut stmt = self.conn.prepare_cached("SELECT name FROM functions WHERE address = ?1")?;
        Ok(stmt.query_row(params![address as i64], |row| row.get(0)).optional()?)
    }

    fn add_reference(&mut self, from: Address, to: Address) -> StoreResult<bool> {
        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO data_refs (from_addr, to_addr) VALUES (?1, ?2)",
            params![from as i64, to as i64],
        )?;
        Ok(changed > 0)
    }

    fn get_comment(&self, address: Address) -> StoreResult<Option<String>> {
        let mut stmt = self.conn.prepare_cached("SELECT text FROM comments WHERE address = ?1")?;
        Ok(stmt.query_row(params![address as i64], |row| row.get(0)).optional()?)
    }

    fn set_comment(&mut self, address: Address, text: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO comments (address, text) VALUES (?1, ?2)",
            params![address as i64, text],
        )?;
        Ok(())
    }
}

/// Apply schema migrations to bring the database to the latest version.
///
/// We use `PRAGMA user_version` as the schema version indicator.
///
/// Version map:
/// - 0: no schema
/// - 1: analysis tables (segments, heads, data_refs, memory, instructions, functions, comments)
/// - 2: add snapshots and xref_runs bookkeeping
fn apply_migrations(conn: &Connection) -> DbResult<()> {
    let current_version = current_schema_version(conn)?;

    // Reject DBs created with a newer schema than we support.
    if current_version > CURRENT_SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            found: current_version,
            min_supported: MIN_SUPPORTED_SCHEMA_VERSION,
            max_supported: CURRENT_SCHEMA_VERSION,
        });
    }

    if current_version < 1 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS segments (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                name       TEXT NOT NULL UNIQUE,
                start_addr INTEGER NOT NULL,
                end_addr   INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS heads (
                address INTEGER PRIMARY KEY
            );

            CREATE TABLE IF NOT EXISTS data_refs (
                from_addr INTEGER NOT NULL,
                to_addr   INTEGER NOT NULL,
                PRIMARY KEY (from_addr, to_addr)
            );
            CREATE INDEX IF NOT EXISTS idx_data_refs_to ON data_refs (to_addr);

            CREATE TABLE IF NOT EXISTS memory (
                address INTEGER PRIMARY KEY,
                byte    INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS instructions (
                address  INTEGER PRIMARY KEY,
                mnemonic TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS functions (
                address INTEGER PRIMARY KEY,
                name    TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS comments (
                address INTEGER PRIMARY KEY,
                text    TEXT NOT NULL
            );

            PRAGMA user_version = 1;
            COMMIT;
            "#,
        )?;
    }

    if current_version < 2 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS snapshots (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                source      TEXT NOT NULL,
                sha256      TEXT NOT NULL,
                imported_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS xref_runs (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                status          TEXT NOT NULL,
                started_at      TEXT NOT NULL,
                finished_at     TEXT NOT NULL,
                candidate_pairs INTEGER NOT NULL,
                methods         INTEGER NOT NULL,
                xrefs_added     INTEGER NOT NULL,
                error           TEXT
            );

            PRAGMA user_version = 2;
            COMMIT;
            "#,
        )?;
    }

    Ok(())
}

/// Read the SQLite schema version from `PRAGMA user_version`.
fn current_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    Ok(version)
}

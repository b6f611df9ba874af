//! Backing-store interface.
//!
//! The analysis engine that owns segments, analyzed units, reference edges,
//! raw memory, mnemonics, function names and comments is external to this
//! crate. The pipeline reaches it only through [`AnalysisStore`], which is
//! injected explicitly into every component.
//!
//! Two implementations ship with the crate:
//! - [`MemoryStore`]: in-memory maps, handy for tests and embedding.
//! - [`crate::db::AnalysisDb`]: SQLite-backed analysis database.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::model::{Address, Segment};

pub mod memory;
pub mod snapshot;

pub use memory::MemoryStore;
pub use snapshot::{SnapshotError, SnapshotFormat, StoreSnapshot};

/// Error type for backing-store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// One or more bytes of a read are not backed by loaded memory.
    #[error("Address 0x{0:x} is not mapped in the analysis store")]
    Unmapped(Address),

    /// Underlying SQLite error.
    #[error("SQLite error: {0}")]
    Sql(#[from] rusqlite::Error),

    /// Stored data violates an invariant of the store itself.
    #[error("Corrupt analysis store: {0}")]
    Corrupt(String),
}

/// Convenience result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Narrow query/mutation interface onto the analysis engine's database.
///
/// Queries take `&self` and must have no observable side effects. The two
/// mutations take `&mut self`; the pipeline is their only caller and never
/// reverts a write once made.
pub trait AnalysisStore {
    /// Every segment known to the analysis engine.
    fn list_segments(&self) -> StoreResult<Vec<Segment>>;

    /// Analyzed unit ("head") addresses inside `segment`, ascending.
    fn analyzed_units(&self, segment: &Segment) -> StoreResult<Vec<Address>>;

    /// Sources of every existing data-reference edge whose destination is `address`.
    fn data_references_to(&self, address: Address) -> StoreResult<BTreeSet<Address>>;

    /// Little-endian unsigned 32-bit word at `address`.
    fn read_u32_le(&self, address: Address) -> StoreResult<u32>;

    /// Mnemonic of the instruction at `address`, if one was decoded there.
    fn mnemonic_at(&self, address: Address) -> StoreResult<Option<String>>;

    /// Name of the function starting at `address`, if known.
    fn function_name_at(&self, address: Address) -> StoreResult<Option<String>>;

    /// Record a read-class data reference `from -> to`.
    ///
    /// Edges form a set: returns `true` if the edge was new, `false` if it
    /// already existed.
    fn add_reference(&mut self, from: Address, to: Address) -> StoreResult<bool>;

    /// Regular comment at `address`, if any.
    fn get_comment(&self, address: Address) -> StoreResult<Option<String>>;

    /// Replace the comment at `address` with `text`.
    fn set_comment(&mut self, address: Address, text: &str) -> StoreResult<()>;
}

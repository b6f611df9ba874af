//! Serializable dump of an analysis database.
//!
//! A snapshot is what an external analysis engine exports so the pipeline can
//! run without it: segments, analyzed heads, existing data references, raw
//! memory, decoded mnemonics, function names and comments. Snapshots are read
//! from JSON (`.json`) or YAML (anything else).

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Address, Segment};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Failed to read snapshot at {path}: {source}")]
    Io { path: String, source: std::io::Error },

    #[error("Failed to parse snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse snapshot YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid snapshot: {0}")]
    Invalid(String),
}

/// On-disk encoding of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Yaml,
}

impl SnapshotFormat {
    /// JSON for a `.json` extension, YAML otherwise.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SnapshotFormat::Json,
            _ => SnapshotFormat::Yaml,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataRefEntry {
    pub from: Address,
    pub to: Address,
}

/// Little-endian 32-bit word laid into memory at `address`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEntry {
    pub address: Address,
    pub value: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteEntry {
    pub address: Address,
    pub value: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionEntry {
    pub address: Address,
    pub mnemonic: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionEntry {
    pub address: Address,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentEntry {
    pub address: Address,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub heads: Vec<Address>,
    #[serde(default)]
    pub data_refs: Vec<DataRefEntry>,
    #[serde(default)]
    pub words: Vec<WordEntry>,
    #[serde(default)]
    pub bytes: Vec<ByteEntry>,
    #[serde(default)]
    pub instructions: Vec<InstructionEntry>,
    #[serde(default)]
    pub functions: Vec<FunctionEntry>,
    #[serde(default)]
    pub comments: Vec<CommentEntry>,
}

impl StoreSnapshot {
    /// Parse and validate a snapshot from raw bytes.
    pub fn from_bytes(bytes: &[u8], format: SnapshotFormat) -> Result<Self, SnapshotError> {
        let snapshot: StoreSnapshot = match format {
            SnapshotFormat::Json => serde_json::from_slice(bytes)?,
            SnapshotFormat::Yaml => serde_yaml::from_slice(bytes)?,
        };
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Read a snapshot from disk, picking the format from the extension.
    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let bytes = std::fs::read(path)
            .map_err(|source| SnapshotError::Io { path: path.display().to_string(), source })?;
        Self::from_bytes(&bytes, SnapshotFormat::from_path(path))
    }

    /// Reject segments with inverted ranges or duplicate names.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        let mut seen = std::collections::BTreeSet::new();
        for segment in &self.segments {
            if segment.start > segment.end {
                return Err(SnapshotError::Invalid(format!(
                    "segment '{}' ends (0x{:x}) before it starts (0x{:x})",
                    segment.name, segment.end, segment.start
                )));
            }
            if !seen.insert(segment.name.as_str()) {
                return Err(SnapshotError::Invalid(format!(
                    "segment '{}' is listed more than once",
                    segment.name
                )));
            }
        }
        Ok(())
    }

    /// Every memory byte described by `words` and `bytes`, words first.
    ///
    /// Explicit `bytes` entries override overlapping word bytes.
    pub fn memory_bytes(&self) -> Vec<(Address, u8)> {
        let mut out = Vec::with_capacity(self.words.len() * 4 + self.bytes.len());
        for word in &self.words {
            for (offset, byte) in word.value.to_le_bytes().iter().enumerate() {
                out.push((word.address + offset as u64, *byte));
            }
        }
        out.extend(self.bytes.iter().map(|b| (b.address, b.value)));
        out
    }
}

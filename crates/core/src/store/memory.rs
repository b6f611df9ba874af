use std::collections::{BTreeMap, BTreeSet};

use crate::model::{Address, Segment};
use crate::store::{AnalysisStore, StoreError, StoreResult, StoreSnapshot};

/// In-memory [`AnalysisStore`].
///
/// Reference edges are indexed by destination, matching how the pipeline
/// queries them.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    segments: Vec<Segment>,
    heads: BTreeSet<Address>,
    refs_to: BTreeMap<Address, BTreeSet<Address>>,
    memory: BTreeMap<Address, u8>,
    mnemonics: BTreeMap<Address, String>,
    functions: BTreeMap<Address, String>,
    comments: BTreeMap<Address, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store populated from a snapshot.
    pub fn from_snapshot(snapshot: &StoreSnapshot) -> Self {
        let mut store = Self::new();
        for segment in &snapshot.segments {
            store.add_segment(segment.clone());
        }
        for head in &snapshot.heads {
            store.add_head(*head);
        }
        for edge in &snapshot.data_refs {
            store.add_data_ref(edge.from, edge.to);
        }
        for (address, byte) in snapshot.memory_bytes() {
            store.memory.insert(address, byte);
        }
        for insn in &snapshot.instructions {
            store.set_mnemonic(insn.address, &insn.mnemonic);
        }
        for func in &snapshot.functions {
            store.set_function_name(func.address, &func.name);
        }
        for comment in &snapshot.comments {
            store.comments.insert(comment.address, comment.text.clone());
        }
        store
    }

    pub fn add_segment(&mut self, segment: Segment) -> &mut Self {
        self.segments.push(segment);
        self
    }

    pub fn add_head(&mut self, address: Address) -> &mut Self {
        self.heads.insert(address);
        self
    }

    /// Record an existing data reference `from -> to`, as the analysis engine would.
    pub fn add_data_ref(&mut self, from: Address, to: Address) -> &mut Self {
        self.refs_to.entry(to).or_default().insert(from);
        self
    }

    pub fn write_bytes(&mut self, address: Address, bytes: &[u8]) -> &mut Self {
        for (offset, byte) in bytes.iter().enumerate() {
            self.memory.insert(address + offset as u64, *byte);
        }
        self
    }

    pub fn write_u32_le(&mut self, address: Address, value: u32) -> &mut Self {
        self.write_bytes(address, &value.to_le_bytes())
    }

    pub fn set_mnemonic(&mut self, address: Address, mnemonic: &str) -> &mut Self {
        self.mnemonics.insert(address, mnemonic.to_string());
        self
    }

    pub fn set_function_name(&mut self, address: Address, name: &str) -> &mut Self {
        self.functions.insert(address, name.to_string());
        self
    }

    /// True if a reference edge `from -> to` exists.
    pub fn has_reference(&self, from: Address, to: Address) -> bool {
        self.refs_to.get(&to).is_some_and(|sources| sources.contains(&from))
    }

    /// Total number of reference edges.
    pub fn reference_count(&self) -> usize {
        self.refs_to.values().map(BTreeSet::len).sum()
    }

    /// Every address that carries a comment.
    pub fn commented_addresses(&self) -> Vec<Address> {
        self.comments.keys().copied().collect()
    }
}

impl AnalysisStore for MemoryStore {
    fn list_segments(&self) -> StoreResult<Vec<Segment>> {
        Ok(self.segments.clone())
    }

    fn analyzed_units(&self, segment: &Segment) -> StoreResult<Vec<Address>> {
        if segment.start >= segment.end {
            return Ok(Vec::new());
        }
        Ok(self.heads.range(segment.start..segment.end).copied().collect())
    }

    fn data_references_to(&self, address: Address) -> StoreResult<BTreeSet<Address>> {
        Ok(self.refs_to.get(&address).cloned().unwrap_or_default())
    }

    fn read_u32_le(&self, address: Address) -> StoreResult<u32> {
        let mut bytes = [0u8; 4];
        for (offset, slot) in bytes.iter_mut().enumerate() {
            let at = address + offset as u64;
            *slot = *self.memory.get(&at).ok_or(StoreError::Unmapped(at))?;
        }
        Ok(u32::from_le_bytes(bytes))
    }

    fn mnemonic_at(&self, address: Address) -> StoreResult<Option<String>> {
        Ok(self.mnemonics.get(&address).cloned())
    }

    fn function_name_at(&self, address: Address) -> StoreResult<Option<String>> {
        Ok(self.functions.get(&address).cloned())
    }

    fn add_reference(&mut self, from: Address, to: Address) -> StoreResult<bool> {
        Ok(self.refs_to.entry(to).or_default().insert(from))
    }

    fn get_comment(&self, address: Address) -> StoreResult<Option<String>> {
        Ok(self.comments.get(&address).cloned())
    }

    fn set_comment(&mut self, address: Address, text: &str) -> StoreResult<()> {
        self.comments.insert(address, text.to_string());
        Ok(())
    }
}

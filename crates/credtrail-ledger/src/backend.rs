//! Storage backends for the ledger's committed state.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::LedgerError;

/// A committed value together with the ledger height that wrote it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedValue {
    pub version: u64,
    pub value: Vec<u8>,
}

/// Buffered writes of one transaction, applied all-or-nothing.
pub type WriteSet = BTreeMap<Vec<u8>, Vec<u8>>;

/// Committed-state storage underneath a [`Ledger`](crate::Ledger).
///
/// `apply` is only ever called with the ledger's commit lock held, so
/// implementations need not serialise writers themselves; they must however
/// make each `apply` atomic with respect to readers.
pub trait KvBackend: Send + Sync {
    /// Read the committed value at `key`.
    fn get(&self, key: &[u8]) -> Result<Option<VersionedValue>, LedgerError>;

    /// Up to `limit` entries with `start <= key < end`, in ascending key order.
    fn scan(
        &self,
        start: &[u8],
        end: &[u8],
        limit: usize,
    ) -> Result<Vec<(Vec<u8>, VersionedValue)>, LedgerError>;

    /// Apply `writes` at a new height and return that height.
    fn apply(&self, writes: &WriteSet) -> Result<u64, LedgerError>;

    /// Height of the last applied commit (0 for an empty ledger).
    fn height(&self) -> Result<u64, LedgerError>;
}

#[derive(Debug, Default)]
struct MemoryState {
    entries: BTreeMap<Vec<u8>, VersionedValue>,
    height: u64,
}

/// In-process backend over an ordered map.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: RwLock<MemoryState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed keys.
    pub fn len(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> LedgerError {
    LedgerError::Backend("memory backend lock poisoned".into())
}

impl KvBackend for MemoryBackend {
    fn get(&self, key: &[u8]) -> Result<Option<VersionedValue>, LedgerError> {
        let state = self.state.read().map_err(|_| poisoned())?;
        Ok(state.entries.get(key).cloned())
    }

    fn scan(
        &self,
        start: &[u8],
        end: &[u8],
        limit: usize,
    ) -> Result<Vec<(Vec<u8>, VersionedValue)>, LedgerError> {
        if start >= end {
            return Ok(Vec::new());
        }
        let state = self.state.read().map_err(|_| poisoned())?;
        Ok(state
            .entries
            .range(start.to_vec()..end.to_vec())
            .take(limit)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn apply(&self, writes: &WriteSet) -> Result<u64, LedgerError> {
        let mut state = self.state.write().map_err(|_| poisoned())?;
        let version = state.height + 1;
        for (key, value) in writes {
            state.entries.insert(
                key.clone(),
                VersionedValue {
                    version,
                    value: value.clone(),
                },
            );
        }
        state.height = version;
        Ok(version)
    }

    fn height(&self) -> Result<u64, LedgerError> {
        Ok(self.state.read().map_err(|_| poisoned())?.height)
    }
}

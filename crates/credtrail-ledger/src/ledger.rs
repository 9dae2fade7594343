//! The versioned ledger: transaction boundaries, optimistic validation, and
//! post-commit events.

use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

use crate::backend::{KvBackend, MemoryBackend, WriteSet};
use crate::error::LedgerError;
use crate::key::printable_key;
use crate::rocks::RocksBackend;
use crate::transaction::{ReadSet, Transaction};

const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// An event published to subscribers after its transaction committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEvent {
    pub tx_id: String,
    pub block_height: u64,
    pub name: String,
    pub payload: Vec<u8>,
}

/// Outcome of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    pub tx_id: String,
    /// Height the writes were applied at, or the unchanged height for a
    /// read-only transaction.
    pub height: u64,
    /// Number of keys written.
    pub writes: usize,
}

/// A transactional key-value ledger.
///
/// Every transaction buffers its writes and remembers the version of every
/// key it read. Commit re-checks those versions under a single commit lock
/// and applies the writes atomically only if none changed; otherwise the
/// whole transaction is rejected with [`LedgerError::Conflict`].
pub struct Ledger {
    backend: Arc<dyn KvBackend>,
    commit_lock: Mutex<()>,
    events: broadcast::Sender<LedgerEvent>,
}

impl Ledger {
    /// Create a ledger over an arbitrary backend.
    pub fn new(backend: impl KvBackend + 'static) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            backend: Arc::new(backend),
            commit_lock: Mutex::new(()),
            events,
        }
    }

    /// Create an empty in-memory ledger.
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// Open (or create) a RocksDB-backed ledger at `path`.
    pub fn open(path: &Path) -> Result<Self, LedgerError> {
        Ok(Self::new(RocksBackend::open(path)?))
    }

    /// Start a new transaction against the current committed state.
    pub fn begin(&self) -> Transaction<'_> {
        Transaction::new(self, uuid::Uuid::now_v7().to_string())
    }

    /// Subscribe to events of transactions committed from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.events.subscribe()
    }

    /// Height of the last commit.
    pub fn height(&self) -> Result<u64, LedgerError> {
        self.backend.height()
    }

    pub(crate) fn backend(&self) -> &dyn KvBackend {
        self.backend.as_ref()
    }

    pub(crate) fn commit(
        &self,
        tx_id: String,
        reads: ReadSet,
        writes: WriteSet,
        event: Option<(String, Vec<u8>)>,
    ) -> Result<CommitReceipt, LedgerError> {
        if writes.is_empty() {
            if event.is_some() {
                tracing::debug!(%tx_id, "dropping event of read-only transaction");
            }
            return Ok(CommitReceipt {
                tx_id,
                height: self.backend.height()?,
                writes: 0,
            });
        }

        let height = {
            let _guard = self
                .commit_lock
                .lock()
                .map_err(|_| LedgerError::Backend("commit lock poisoned".into()))?;

            for (key, observed) in &reads {
                let current = self.backend.get(key)?.map(|v| v.version);
                if current != *observed {
                    let key = printable_key(key);
                    tracing::warn!(%tx_id, %key, "transaction rejected: read conflict");
                    return Err(LedgerError::Conflict { key });
                }
            }

            self.backend.apply(&writes)?
        };

        tracing::debug!(%tx_id, height, writes = writes.len(), "transaction committed");

        if let Some((name, payload)) = event {
            // No subscribers is not an error.
            let _ = self.events.send(LedgerEvent {
                tx_id: tx_id.clone(),
                block_height: height,
                name,
                payload,
            });
        }

        Ok(CommitReceipt {
            tx_id,
            height,
            writes: writes.len(),
        })
    }
}

/// Ledger errors.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid bookmark: {0}")]
    InvalidBookmark(String),

    #[error("read conflict on key {key}: version changed since it was read")]
    Conflict { key: String },

    #[error("corrupt record at {key}: {reason}")]
    CorruptRecord { key: String, reason: String },

    #[error("backend error: {0}")]
    Backend(String),

    #[error("rocksdb error: {0}")]
    RocksDb(#[from] rocksdb::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl LedgerError {
    /// Whether the failure was an optimistic-concurrency conflict, i.e.
    /// re-running the whole transaction may succeed.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

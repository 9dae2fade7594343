//! Credtrail Ledger — a versioned, transactional key-value ledger.
//!
//! Provides the state interface the credential contract runs against:
//! point reads and writes, composite keys, paginated prefix scans with opaque
//! bookmarks, and a post-commit event side channel. Each [`Transaction`]
//! commits atomically and is rejected if any key it read changed underneath
//! it.

pub mod backend;
pub mod error;
pub mod key;
pub mod ledger;
pub mod rocks;
pub mod transaction;

pub use backend::{KvBackend, MemoryBackend, VersionedValue, WriteSet};
pub use error::LedgerError;
pub use key::{create_composite_key, printable_key, split_composite_key};
pub use ledger::{CommitReceipt, Ledger, LedgerEvent};
pub use rocks::RocksBackend;
pub use transaction::{KeyValue, LedgerStub, QueryMetadata, Transaction};

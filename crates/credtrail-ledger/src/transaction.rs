//! Per-call transactions and the stub interface the contract programs against.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use std::collections::BTreeMap;

use crate::backend::WriteSet;
use crate::error::LedgerError;
use crate::key::{create_composite_key, prefix_range, printable_key};
use crate::ledger::{CommitReceipt, Ledger};

/// Versions observed by a transaction, `None` meaning "absent when read".
pub(crate) type ReadSet = BTreeMap<Vec<u8>, Option<u64>>;

/// A key and its committed value, as returned by range queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Vec<u8>,
}

/// Pagination metadata of a range query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryMetadata {
    pub fetched_records_count: usize,
    /// Opaque cursor for the next page; empty once the range is exhausted.
    pub bookmark: String,
}

/// The ledger operations available to contract code inside one transaction.
pub trait LedgerStub {
    /// Identifier of the enclosing transaction.
    fn tx_id(&self) -> &str;

    /// Read a key. The observed version joins the transaction's read set.
    fn get_state(&mut self, key: &str) -> Result<Option<Vec<u8>>, LedgerError>;

    /// Buffer a write; it becomes visible to others only on commit.
    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), LedgerError>;

    /// Build a composite key; see [`create_composite_key`].
    fn create_composite_key(
        &self,
        object_type: &str,
        attributes: &[&str],
    ) -> Result<String, LedgerError> {
        create_composite_key(object_type, attributes)
    }

    /// Page through committed keys whose leading composite segments equal
    /// `object_type` and `attributes`, in key order.
    ///
    /// An empty `bookmark` starts at the beginning of the range. A bookmark
    /// that does not decode, lies outside the range, or names a key that does
    /// not exist is rejected with [`LedgerError::InvalidBookmark`].
    fn scan_partial_key(
        &mut self,
        object_type: &str,
        attributes: &[&str],
        page_size: u32,
        bookmark: &str,
    ) -> Result<(Vec<KeyValue>, QueryMetadata), LedgerError>;

    /// Attach an event to be published if and when the transaction commits.
    /// A later call replaces an earlier one.
    fn set_event(&mut self, name: &str, payload: Vec<u8>) -> Result<(), LedgerError>;
}

/// A single ledger transaction.
///
/// Dropping a transaction without calling [`Transaction::commit`] discards
/// its writes and its event.
pub struct Transaction<'a> {
    ledger: &'a Ledger,
    tx_id: String,
    reads: ReadSet,
    writes: WriteSet,
    event: Option<(String, Vec<u8>)>,
}

impl<'a> Transaction<'a> {
    pub(crate) fn new(ledger: &'a Ledger, tx_id: String) -> Self {
        Self {
            ledger,
            tx_id,
            reads: ReadSet::new(),
            writes: WriteSet::new(),
            event: None,
        }
    }

    /// Validate the read set and apply all buffered writes atomically.
    pub fn commit(self) -> Result<CommitReceipt, LedgerError> {
        self.ledger
            .commit(self.tx_id, self.reads, self.writes, self.event)
    }

    /// Number of writes buffered so far.
    pub fn pending_writes(&self) -> usize {
        self.writes.len()
    }
}

fn encode_bookmark(key: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(key)
}

fn decode_bookmark(bookmark: &str) -> Result<Vec<u8>, LedgerError> {
    URL_SAFE_NO_PAD
        .decode(bookmark)
        .map_err(|e| LedgerError::InvalidBookmark(format!("not a valid bookmark encoding: {}", e)))
}

impl LedgerStub for Transaction<'_> {
    fn tx_id(&self) -> &str {
        &self.tx_id
    }

    fn get_state(&mut self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        let key = key.as_bytes();
        if let Some(pending) = self.writes.get(key) {
            return Ok(Some(pending.clone()));
        }
        let committed = self.ledger.backend().get(key)?;
        self.reads
            .entry(key.to_vec())
            .or_insert_with(|| committed.as_ref().map(|v| v.version));
        Ok(committed.map(|v| v.value))
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), LedgerError> {
        if key.is_empty() {
            return Err(LedgerError::InvalidKey("key must not be empty".into()));
        }
        self.writes.insert(key.as_bytes().to_vec(), value);
        Ok(())
    }

    fn scan_partial_key(
        &mut self,
        object_type: &str,
        attributes: &[&str],
        page_size: u32,
        bookmark: &str,
    ) -> Result<(Vec<KeyValue>, QueryMetadata), LedgerError> {
        if page_size == 0 {
            return Err(LedgerError::InvalidArgument(
                "page size must be at least 1".into(),
            ));
        }

        let prefix = create_composite_key(object_type, attributes)?;
        let (range_start, range_end) = prefix_range(&prefix);

        let start = if bookmark.is_empty() {
            range_start
        } else {
            let key = decode_bookmark(bookmark)?;
            if !key.starts_with(&range_start) {
                return Err(LedgerError::InvalidBookmark(format!(
                    "bookmark points at {} which is outside the queried range {}",
                    printable_key(&key),
                    printable_key(&range_start)
                )));
            }
            if self.ledger.backend().get(&key)?.is_none() {
                return Err(LedgerError::InvalidBookmark(format!(
                    "bookmark points at {} which does not exist",
                    printable_key(&key)
                )));
            }
            key
        };

        // Fetch one extra row: if it exists, it starts the next page.
        let page_size = page_size as usize;
        let mut rows = self
            .ledger
            .backend()
            .scan(&start, &range_end, page_size.saturating_add(1))?;
        let next = if rows.len() > page_size {
            rows.pop().map(|(key, _)| encode_bookmark(&key))
        } else {
            None
        };

        let records = rows
            .into_iter()
            .map(|(key, versioned)| {
                let key = String::from_utf8(key).map_err(|e| LedgerError::CorruptRecord {
                    key: printable_key(e.as_bytes()),
                    reason: "key is not valid UTF-8".into(),
                })?;
                Ok(KeyValue {
                    key,
                    value: versioned.value,
                })
            })
            .collect::<Result<Vec<_>, LedgerError>>()?;

        tracing::debug!(
            tx_id = %self.tx_id,
            prefix = %printable_key(prefix.as_bytes()),
            fetched = records.len(),
            more = next.is_some(),
            "partial composite key scan"
        );

        let metadata = QueryMetadata {
            fetched_records_count: records.len(),
            bookmark: next.unwrap_or_default(),
        };
        Ok((records, metadata))
    }

    fn set_event(&mut self, name: &str, payload: Vec<u8>) -> Result<(), LedgerError> {
        if name.is_empty() {
            return Err(LedgerError::InvalidArgument(
                "event name must not be empty".into(),
            ));
        }
        self.event = Some((name.to_string(), payload));
        Ok(())
    }
}

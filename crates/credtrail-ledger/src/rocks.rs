//! RocksDB storage backend for the ledger.

use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, Direction, IteratorMode, Options, WriteBatch, DB};
use std::path::Path;

use crate::backend::{KvBackend, VersionedValue, WriteSet};
use crate::error::LedgerError;
use crate::key::printable_key;

/// Column family names.
const CF_STATE: &str = "state";
const CF_META: &str = "meta";

const HEIGHT_KEY: &[u8] = b"height";
const VERSION_LEN: usize = 8;

/// RocksDB-backed committed state.
///
/// Values in the `state` column family are stored as an 8-byte big-endian
/// version followed by the payload; the current height lives in `meta`.
pub struct RocksBackend {
    db: DB,
}

impl RocksBackend {
    /// Open or create a RocksDB database at the given path with column families.
    pub fn open(path: &Path) -> Result<Self, LedgerError> {
        std::fs::create_dir_all(path)?;

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors = vec![
            ColumnFamilyDescriptor::new(CF_STATE, Options::default()),
            ColumnFamilyDescriptor::new(CF_META, Options::default()),
        ];

        let db = DB::open_cf_descriptors(&opts, path, cf_descriptors)?;
        tracing::debug!(path = %path.display(), "rocksdb ledger opened");

        Ok(Self { db })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily, LedgerError> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| LedgerError::Backend(format!("column family '{}' not found", name)))
    }

    fn decode(key: &[u8], raw: &[u8]) -> Result<VersionedValue, LedgerError> {
        if raw.len() < VERSION_LEN {
            return Err(LedgerError::CorruptRecord {
                key: printable_key(key),
                reason: format!("stored value is {} bytes, shorter than its version", raw.len()),
            });
        }
        let (version, value) = raw.split_at(VERSION_LEN);
        let mut buf = [0u8; VERSION_LEN];
        buf.copy_from_slice(version);
        Ok(VersionedValue {
            version: u64::from_be_bytes(buf),
            value: value.to_vec(),
        })
    }

    fn encode(version: u64, value: &[u8]) -> Vec<u8> {
        let mut raw = Vec::with_capacity(VERSION_LEN + value.len());
        raw.extend_from_slice(&version.to_be_bytes());
        raw.extend_from_slice(value);
        raw
    }
}

impl KvBackend for RocksBackend {
    fn get(&self, key: &[u8]) -> Result<Option<VersionedValue>, LedgerError> {
        let cf = self.cf(CF_STATE)?;
        match self.db.get_cf(cf, key)? {
            Some(raw) => Ok(Some(Self::decode(key, &raw)?)),
            None => Ok(None),
        }
    }

    fn scan(
        &self,
        start: &[u8],
        end: &[u8],
        limit: usize,
    ) -> Result<Vec<(Vec<u8>, VersionedValue)>, LedgerError> {
        let cf = self.cf(CF_STATE)?;
        let mut out = Vec::new();
        if start >= end || limit == 0 {
            return Ok(out);
        }
        for item in self
            .db
            .iterator_cf(cf, IteratorMode::From(start, Direction::Forward))
        {
            let (key, raw) = item?;
            if key.as_ref() >= end {
                break;
            }
            let value = Self::decode(&key, &raw)?;
            out.push((key.to_vec(), value));
            if out.len() == limit {
                break;
            }
        }
        Ok(out)
    }

    fn apply(&self, writes: &WriteSet) -> Result<u64, LedgerError> {
        let state = self.cf(CF_STATE)?;
        let meta = self.cf(CF_META)?;
        let version = self.height()? + 1;

        let mut batch = WriteBatch::default();
        for (key, value) in writes {
            batch.put_cf(state, key, Self::encode(version, value));
        }
        batch.put_cf(meta, HEIGHT_KEY, version.to_be_bytes());
        self.db.write(batch)?;

        Ok(version)
    }

    fn height(&self) -> Result<u64, LedgerError> {
        let meta = self.cf(CF_META)?;
        match self.db.get_cf(meta, HEIGHT_KEY)? {
            Some(raw) => {
                let bytes: [u8; VERSION_LEN] = raw.as_slice().try_into().map_err(|_| {
                    LedgerError::CorruptRecord {
                        key: "meta:height".into(),
                        reason: format!("expected {} bytes, found {}", VERSION_LEN, raw.len()),
                    }
                })?;
                Ok(u64::from_be_bytes(bytes))
            }
            None => Ok(0),
        }
    }
}

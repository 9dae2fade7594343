//! Credential Store: the only code that reads or writes credential records.

use credtrail_core::Credential;
use credtrail_ledger::{printable_key, LedgerStub};

use crate::error::{key_error, ContractError};

/// Composite-key object type for credential records. Disjoint from the
/// audit-trail object type, so the two never collide in the shared keyspace.
pub const CREDENTIAL_OBJECT_TYPE: &str = "cred";

/// Credential persistence over a ledger transaction.
pub struct CredentialStore;

impl CredentialStore {
    /// Ledger key of a credential.
    pub fn key<S: LedgerStub + ?Sized>(stub: &S, cred_id: &str) -> Result<String, ContractError> {
        stub.create_composite_key(CREDENTIAL_OBJECT_TYPE, &[cred_id])
            .map_err(key_error)
    }

    /// Whether a credential with this id has been issued.
    pub fn exists<S: LedgerStub + ?Sized>(stub: &mut S, cred_id: &str) -> Result<bool, ContractError> {
        let key = Self::key(stub, cred_id)?;
        Ok(stub.get_state(&key)?.is_some())
    }

    /// Load a credential, failing with `NotFound` if it was never issued.
    pub fn get<S: LedgerStub + ?Sized>(
        stub: &mut S,
        cred_id: &str,
    ) -> Result<Credential, ContractError> {
        let key = Self::key(stub, cred_id)?;
        let bytes = stub
            .get_state(&key)?
            .ok_or_else(|| ContractError::NotFound {
                cred_id: cred_id.to_string(),
            })?;
        serde_json::from_slice(&bytes).map_err(|source| ContractError::Serialization {
            key: printable_key(key.as_bytes()),
            source,
        })
    }

    /// Persist a new credential.
    ///
    /// The existence check reads the key inside the caller's transaction, so
    /// a concurrent issuance of the same id makes one of the two commits fail
    /// instead of both succeeding.
    pub fn create<S: LedgerStub + ?Sized>(
        stub: &mut S,
        credential: &Credential,
    ) -> Result<(), ContractError> {
        if Self::exists(stub, &credential.cred_id)? {
            return Err(ContractError::AlreadyExists {
                cred_id: credential.cred_id.clone(),
            });
        }
        Self::write(stub, credential)
    }

    /// Rewrite an existing credential in full. The stored `created_at` wins
    /// over whatever the caller passes. Returns the record as written.
    pub fn update<S: LedgerStub + ?Sized>(
        stub: &mut S,
        credential: &Credential,
    ) -> Result<Credential, ContractError> {
        let stored = Self::get(stub, &credential.cred_id)?;
        let mut record = credential.clone();
        record.created_at = stored.created_at;
        Self::write(stub, &record)?;
        Ok(record)
    }

    fn write<S: LedgerStub + ?Sized>(
        stub: &mut S,
        credential: &Credential,
    ) -> Result<(), ContractError> {
        let key = Self::key(stub, &credential.cred_id)?;
        let bytes = serde_json::to_vec(credential).map_err(|source| {
            ContractError::Serialization {
                key: printable_key(key.as_bytes()),
                source,
            }
        })?;
        stub.put_state(&key, bytes)?;
        Ok(())
    }
}

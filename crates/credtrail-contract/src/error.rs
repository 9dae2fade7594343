use credtrail_ledger::LedgerError;

/// Contract errors. Any of these aborts the enclosing transaction.
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    #[error("credential {cred_id} not found")]
    NotFound { cred_id: String },

    #[error("credential {cred_id} already exists")]
    AlreadyExists { cred_id: String },

    #[error("credential {cred_id} is already revoked")]
    AlreadyRevoked { cred_id: String },

    #[error("audit event {event_id} for credential {cred_id} already exists")]
    DuplicateEvent { event_id: String, cred_id: String },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("invalid bookmark for holder {holder_did}: {reason}")]
    InvalidBookmark { holder_did: String, reason: String },

    #[error("malformed record at {key}: {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage error: {0}")]
    Storage(#[from] LedgerError),
}

impl ContractError {
    /// Whether the transaction lost an optimistic-concurrency race and may
    /// succeed if the caller re-runs it.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Storage(e) if e.is_conflict())
    }

    /// Whether the request itself was malformed.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidBookmark { .. })
    }
}

/// Key construction fails only on caller-supplied segments, so surface it as
/// a validation problem rather than a storage one.
pub(crate) fn key_error(err: LedgerError) -> ContractError {
    match err {
        LedgerError::InvalidKey(reason) => ContractError::Validation(reason),
        other => ContractError::Storage(other),
    }
}

/// Reject empty required fields, naming the field.
pub(crate) fn require(field: &str, value: &str) -> Result<(), ContractError> {
    if value.trim().is_empty() {
        return Err(ContractError::Validation(format!(
            "{} must not be empty",
            field
        )));
    }
    Ok(())
}

/// Like [`require`], but names the credential the request was about.
pub(crate) fn require_for(cred_id: &str, field: &str, value: &str) -> Result<(), ContractError> {
    if value.trim().is_empty() {
        return Err(ContractError::Validation(format!(
            "{field} must not be empty (credential {cred_id})"
        )));
    }
    Ok(())
}

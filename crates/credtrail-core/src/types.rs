use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::credential_state::{CredentialState, CredentialStateMachine};
use crate::error::CoreError;

/// On-ledger credential metadata.
///
/// Only a content hash of the off-chain credential is kept here; claims and
/// other personal data never reach the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    /// Unique, immutable credential identifier.
    pub cred_id: String,
    /// DID of the credential holder.
    pub holder_did: String,
    /// Free-form credential type (e.g. "Diploma").
    pub cred_type: String,
    /// Opaque hash of the off-chain credential payload.
    pub hashed_data: String,
    /// Identifier of the issuing organisation.
    pub issuer_id: String,
    /// Lifecycle state.
    pub status: CredentialState,
    /// Issuance time; never changes after creation.
    pub created_at: DateTime<Utc>,
    /// Time of the last state change.
    pub updated_at: DateTime<Utc>,
}

impl Credential {
    /// Build a freshly issued credential in the initial state.
    pub fn issued(
        cred_id: impl Into<String>,
        holder_did: impl Into<String>,
        cred_type: impl Into<String>,
        hashed_data: impl Into<String>,
        issuer_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            cred_id: cred_id.into(),
            holder_did: holder_did.into(),
            cred_type: cred_type.into(),
            hashed_data: hashed_data.into(),
            issuer_id: issuer_id.into(),
            status: CredentialStateMachine::initial(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the credential is currently usable.
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Move the credential to `Revoked`, stamping `updated_at`.
    pub fn revoke(&mut self, now: DateTime<Utc>) -> Result<(), CoreError> {
        self.status = CredentialStateMachine::transition(self.status, AccessAction::Revoke)?;
        self.updated_at = now;
        Ok(())
    }
}

/// Kind of access recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessAction {
    Issue,
    Verify,
    Revoke,
}

impl fmt::Display for AccessAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Issue => write!(f, "Issue"),
            Self::Verify => write!(f, "Verify"),
            Self::Revoke => write!(f, "Revoke"),
        }
    }
}

/// Result of an audited access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessOutcome {
    Success,
    Failure,
}

impl fmt::Display for AccessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "Success"),
            Self::Failure => write!(f, "Failure"),
        }
    }
}

/// An immutable audit-trail entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessEvent {
    /// Unique event identifier.
    pub event_id: String,
    /// Credential the access concerned.
    pub cred_id: String,
    /// Holder of that credential, copied so holder-scoped scans need no join.
    pub holder_did: String,
    /// What was done.
    pub action: AccessAction,
    /// Who did it (issuer, verifier, or revoker).
    pub actor_id: String,
    /// How it ended.
    pub outcome: AccessOutcome,
    /// Optional free-text reason, e.g. for revocations.
    #[serde(default)]
    pub reason: Option<String>,
    /// When the access happened.
    pub occurred_at: DateTime<Utc>,
}

impl AccessEvent {
    /// Build a successful access event for `credential`.
    pub fn success(
        event_id: impl Into<String>,
        credential: &Credential,
        action: AccessAction,
        actor_id: impl Into<String>,
        reason: Option<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            cred_id: credential.cred_id.clone(),
            holder_did: credential.holder_did.clone(),
            action,
            actor_id: actor_id.into(),
            outcome: AccessOutcome::Success,
            reason: reason.filter(|r| !r.is_empty()),
            occurred_at,
        }
    }
}

/// Outcome of a verification request. Derived on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub cred_id: String,
    pub is_active: bool,
    /// Whether the off-chain payload still matches `hashed_data`.
    pub hash_matches: bool,
    pub checked_at: DateTime<Utc>,
}

//! The credential contract: Issue, Verify, Revoke, and QueryAuditTrail.
//!
//! Every operation runs inside exactly one ledger transaction. State changes
//! and their audit event are buffered in that transaction and become visible
//! together on commit; any error drops the transaction and nothing is
//! written or published.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use credtrail_core::{
    AccessAction, AccessEvent, Clock, ContractConfig, Credential, IdGenerator, SystemClock,
    UuidV7Ids, VerificationResult,
};
use credtrail_ledger::{Ledger, LedgerStub, Transaction};

use crate::audit::{AuditPage, AuditTrail};
use crate::error::{require, require_for, ContractError};
use crate::store::CredentialStore;
use crate::verification::{HashCheck, PlaceholderHashCheck};

/// Entry point for the four credential operations.
pub struct CredentialContract {
    ledger: Arc<Ledger>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    hash_check: Arc<dyn HashCheck>,
    audit: AuditTrail,
    config: ContractConfig,
}

impl CredentialContract {
    /// Create a contract over `ledger` with wall-clock time, UUID v7 event
    /// ids, the placeholder hash check, and default configuration.
    pub fn new(ledger: Arc<Ledger>) -> Self {
        let config = ContractConfig::default();
        Self {
            ledger,
            clock: Arc::new(SystemClock),
            ids: Arc::new(UuidV7Ids),
            hash_check: Arc::new(PlaceholderHashCheck),
            audit: AuditTrail::new(&config),
            config,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Arc::new(ids);
        self
    }

    pub fn with_hash_check(mut self, hash_check: impl HashCheck + 'static) -> Self {
        self.hash_check = Arc::new(hash_check);
        self
    }

    pub fn with_config(mut self, config: ContractConfig) -> Self {
        self.audit = AuditTrail::new(&config);
        self.config = config;
        self
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn config(&self) -> &ContractConfig {
        &self.config
    }

    /// Issue a new credential in the `Active` state and record an Issue event.
    pub fn issue(
        &self,
        cred_id: &str,
        holder_did: &str,
        cred_type: &str,
        hashed_data: &str,
        issuer_id: &str,
    ) -> Result<Credential, ContractError> {
        require("credId", cred_id)?;
        require_for(cred_id, "holderDid", holder_did)?;
        require_for(cred_id, "credType", cred_type)?;
        require_for(cred_id, "hashedData", hashed_data)?;
        require_for(cred_id, "issuerId", issuer_id)?;

        let credential = self.execute("issue", |tx| {
            let now = self.clock.now();
            let credential =
                Credential::issued(cred_id, holder_did, cred_type, hashed_data, issuer_id, now);
            CredentialStore::create(tx, &credential)?;
            self.record(tx, &credential, AccessAction::Issue, issuer_id, None, now)?;
            Ok(credential)
        })?;

        tracing::info!(
            cred_id = %credential.cred_id,
            holder = %credential.holder_did,
            issuer = %credential.issuer_id,
            cred_type = %credential.cred_type,
            "credential issued"
        );
        Ok(credential)
    }

    /// Check a credential's status and record a Verify event. Never changes
    /// the credential.
    pub fn verify(
        &self,
        cred_id: &str,
        verifier_id: &str,
    ) -> Result<VerificationResult, ContractError> {
        require("credId", cred_id)?;
        require_for(cred_id, "verifierId", verifier_id)?;

        let result = self.execute("verify", |tx| {
            let credential = CredentialStore::get(tx, cred_id)?;
            let now = self.clock.now();
            let result = VerificationResult {
                cred_id: credential.cred_id.clone(),
                is_active: credential.is_active(),
                hash_matches: self.hash_check.matches(&credential),
                checked_at: now,
            };
            self.record(tx, &credential, AccessAction::Verify, verifier_id, None, now)?;
            Ok(result)
        })?;

        tracing::info!(
            cred_id = %result.cred_id,
            verifier = %verifier_id,
            active = result.is_active,
            hash_matches = result.hash_matches,
            "credential verified"
        );
        Ok(result)
    }

    /// Revoke an active credential and record a Revoke event carrying
    /// `reason`. Revocation is permanent.
    pub fn revoke(
        &self,
        cred_id: &str,
        reason: &str,
        revoker_id: &str,
    ) -> Result<Credential, ContractError> {
        require("credId", cred_id)?;
        require_for(cred_id, "revokerId", revoker_id)?;

        let credential = self.execute("revoke", |tx| {
            let mut credential = CredentialStore::get(tx, cred_id)?;
            let now = self.clock.now();
            credential
                .revoke(now)
                .map_err(|_| ContractError::AlreadyRevoked {
                    cred_id: cred_id.to_string(),
                })?;
            let credential = CredentialStore::update(tx, &credential)?;
            self.record(
                tx,
                &credential,
                AccessAction::Revoke,
                revoker_id,
                Some(reason.to_string()),
                now,
            )?;
            Ok(credential)
        })?;

        tracing::info!(
            cred_id = %credential.cred_id,
            holder = %credential.holder_did,
            revoker = %revoker_id,
            reason = %reason,
            "credential revoked"
        );
        Ok(credential)
    }

    /// Page through the audit trail of one holder. Read-only: nothing is
    /// committed and no event is recorded.
    pub fn query_audit_trail(
        &self,
        holder_did: &str,
        page_size: u32,
        bookmark: &str,
    ) -> Result<AuditPage, ContractError> {
        let mut tx = self.ledger.begin();
        self.audit.query(&mut tx, holder_did, page_size, bookmark)
    }

    /// Collect a holder's whole audit trail by following bookmarks.
    pub fn full_audit_trail(&self, holder_did: &str) -> Result<Vec<AccessEvent>, ContractError> {
        let page_size = self.config.effective_page_size(None);
        let mut events = Vec::new();
        let mut bookmark = String::new();
        loop {
            let page = self.query_audit_trail(holder_did, page_size, &bookmark)?;
            events.extend(page.events);
            if page.bookmark.is_empty() {
                return Ok(events);
            }
            bookmark = page.bookmark;
        }
    }

    fn record(
        &self,
        tx: &mut Transaction<'_>,
        credential: &Credential,
        action: AccessAction,
        actor_id: &str,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), ContractError> {
        let event =
            AccessEvent::success(self.ids.next_id(), credential, action, actor_id, reason, now);
        self.audit.append(tx, &event)
    }

    /// Run `op` in a fresh transaction and commit it if `op` succeeds.
    fn execute<T>(
        &self,
        op: &'static str,
        f: impl FnOnce(&mut Transaction<'_>) -> Result<T, ContractError>,
    ) -> Result<T, ContractError> {
        let mut tx = self.ledger.begin();
        let value = match f(&mut tx) {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!(op, tx_id = %tx.tx_id(), error = %err, "operation aborted");
                return Err(err);
            }
        };
        let receipt = tx.commit()?;
        tracing::debug!(
            op,
            tx_id = %receipt.tx_id,
            height = receipt.height,
            "operation committed"
        );
        Ok(value)
    }
}

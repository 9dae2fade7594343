//! Audit Trail: append-only access events, indexed for holder-scoped paging.
//!
//! Events are keyed `event~holder / holderDid / credId / eventId`. Listing a
//! holder's events is then a prefix scan over that holder's slice of the
//! keyspace, costing time proportional to the events returned. Within one
//! credential, events sort by id, and ids are generated in time order.

use credtrail_core::{AccessEvent, ContractConfig};
use credtrail_ledger::{printable_key, LedgerError, LedgerStub};
use serde::{Deserialize, Serialize};

use crate::error::{key_error, require, ContractError};

/// Composite-key object type for audit events.
pub const AUDIT_OBJECT_TYPE: &str = "event~holder";

/// One page of a holder's audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditPage {
    pub events: Vec<AccessEvent>,
    /// Pass back to fetch the next page; empty when there are no more events.
    pub bookmark: String,
}

impl AuditPage {
    pub fn is_last(&self) -> bool {
        self.bookmark.is_empty()
    }
}

/// Appends and pages through access events.
#[derive(Debug, Clone)]
pub struct AuditTrail {
    event_name: String,
    max_page_size: u32,
}

impl AuditTrail {
    pub fn new(config: &ContractConfig) -> Self {
        Self {
            event_name: config.audit_event_name.clone(),
            max_page_size: config.max_page_size.max(1),
        }
    }

    /// Ledger key of an event.
    pub fn key<S: LedgerStub + ?Sized>(
        stub: &S,
        event: &AccessEvent,
    ) -> Result<String, ContractError> {
        stub.create_composite_key(
            AUDIT_OBJECT_TYPE,
            &[
                event.holder_did.as_str(),
                event.cred_id.as_str(),
                event.event_id.as_str(),
            ],
        )
        .map_err(key_error)
    }

    /// Record an event and publish it on the ledger's event channel.
    /// Fails if an event with the same key was already written.
    pub fn append<S: LedgerStub + ?Sized>(
        &self,
        stub: &mut S,
        event: &AccessEvent,
    ) -> Result<(), ContractError> {
        let key = Self::key(stub, event)?;
        if stub.get_state(&key)?.is_some() {
            return Err(ContractError::DuplicateEvent {
                event_id: event.event_id.clone(),
                cred_id: event.cred_id.clone(),
            });
        }

        let bytes = serde_json::to_vec(event).map_err(|source| ContractError::Serialization {
            key: printable_key(key.as_bytes()),
            source,
        })?;
        stub.put_state(&key, bytes.clone())?;
        stub.set_event(&self.event_name, bytes)?;

        tracing::debug!(
            event_id = %event.event_id,
            cred_id = %event.cred_id,
            action = %event.action,
            "audit event appended"
        );
        Ok(())
    }

    /// Return up to `page_size` of `holder_did`'s events in key order, starting
    /// at `bookmark` (empty for the first page).
    ///
    /// Page sizes above the configured maximum are clamped. Following the
    /// returned bookmarks until one comes back empty visits every event of the
    /// holder exactly once, provided nothing is appended to the holder's range
    /// in between.
    pub fn query<S: LedgerStub + ?Sized>(
        &self,
        stub: &mut S,
        holder_did: &str,
        page_size: u32,
        bookmark: &str,
    ) -> Result<AuditPage, ContractError> {
        require("holderDid", holder_did)?;
        if page_size == 0 {
            return Err(ContractError::Validation(
                "pageSize must be at least 1".into(),
            ));
        }
        let page_size = page_size.min(self.max_page_size);

        let (rows, metadata) = stub
            .scan_partial_key(AUDIT_OBJECT_TYPE, &[holder_did], page_size, bookmark)
            .map_err(|err| match err {
                LedgerError::InvalidBookmark(reason) => ContractError::InvalidBookmark {
                    holder_did: holder_did.to_string(),
                    reason,
                },
                other => key_error(other),
            })?;

        let events = rows
            .into_iter()
            .map(|row| {
                serde_json::from_slice::<AccessEvent>(&row.value).map_err(|source| {
                    ContractError::Serialization {
                        key: printable_key(row.key.as_bytes()),
                        source,
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AuditPage {
            events,
            bookmark: metadata.bookmark,
        })
    }
}

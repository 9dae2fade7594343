//! Integration test: credential lifecycle across the contract and the ledger.
//!
//! Drives Issue, Verify, Revoke, and QueryAuditTrail through
//! credtrail-contract on top of an in-memory credtrail-ledger.

use std::sync::Arc;

use credtrail_contract::{AuditTrail, ContractError, CredentialContract, CredentialStore};
use credtrail_core::{AccessAction, AccessEvent, AccessOutcome, CredentialState, IdGenerator};
use credtrail_integration_tests::{deterministic_contract, in_memory_contract, issue_many};
use credtrail_ledger::{Ledger, LedgerStub};

fn actions(events: &[AccessEvent]) -> Vec<AccessAction> {
    events.iter().map(|e| e.action).collect()
}

// =========================================================================
// Issuer → Verifier → Revoker flow
// =========================================================================

#[test]
fn test_diploma_lifecycle() {
    let contract = in_memory_contract();

    let issued = contract
        .issue("C1", "D1", "Diploma", "h1", "Org1")
        .expect("issue should succeed");
    assert_eq!(issued.status, CredentialState::Active);

    let first = contract.verify("C1", "V1").expect("verify should succeed");
    assert!(first.is_active);
    assert!(first.hash_matches);

    let revoked = contract
        .revoke("C1", "expired", "Org1")
        .expect("revoke should succeed");
    assert_eq!(revoked.status, CredentialState::Revoked);
    assert!(revoked.updated_at > revoked.created_at);

    let after_revoke = contract.query_audit_trail("D1", 10, "").unwrap();
    assert_eq!(
        actions(&after_revoke.events),
        vec![AccessAction::Issue, AccessAction::Verify, AccessAction::Revoke]
    );
    assert_eq!(after_revoke.events[2].reason.as_deref(), Some("expired"));
    assert!(after_revoke.is_last());

    let second = contract.verify("C1", "V2").expect("verify after revoke");
    assert!(!second.is_active);

    let full = contract.query_audit_trail("D1", 10, "").unwrap();
    assert_eq!(
        actions(&full.events),
        vec![
            AccessAction::Issue,
            AccessAction::Verify,
            AccessAction::Revoke,
            AccessAction::Verify
        ]
    );
    assert_eq!(full.events[0].actor_id, "Org1");
    assert_eq!(full.events[1].actor_id, "V1");
    assert_eq!(full.events[3].actor_id, "V2");
    assert!(full
        .events
        .iter()
        .all(|e| e.outcome == AccessOutcome::Success && e.holder_did == "D1"));
    // Stepping clock: every event is strictly later than the one before.
    assert!(full
        .events
        .windows(2)
        .all(|w| w[0].occurred_at < w[1].occurred_at));
}

#[test]
fn test_repeated_verify_only_appends_events() {
    let contract = in_memory_contract();
    let issued = contract.issue("C1", "D1", "Diploma", "h1", "Org1").unwrap();

    for verifier in ["V1", "V2", "V3"] {
        assert!(contract.verify("C1", verifier).unwrap().is_active);
    }

    let mut tx = contract.ledger().begin();
    let stored = CredentialStore::get(&mut tx, "C1").unwrap();
    assert_eq!(stored, issued);
    assert_eq!(contract.full_audit_trail("D1").unwrap().len(), 4);
}

#[test]
fn test_rejected_operations_leave_no_trace() {
    let contract = in_memory_contract();
    contract.issue("C1", "D1", "Diploma", "h1", "Org1").unwrap();
    let height = contract.ledger().height().unwrap();

    assert!(contract.issue("C1", "D1", "Diploma", "h1", "Org1").is_err());
    assert!(contract.verify("missing", "V1").is_err());
    contract.revoke("C1", "", "Org1").unwrap();
    assert!(contract.revoke("C1", "again", "Org1").is_err());
    assert!(contract.issue("", "D1", "Diploma", "h1", "Org1").is_err());

    // Only the successful revoke advanced the ledger.
    assert_eq!(contract.ledger().height().unwrap(), height + 1);
    let events = contract.full_audit_trail("D1").unwrap();
    assert_eq!(
        actions(&events),
        vec![AccessAction::Issue, AccessAction::Revoke]
    );
    assert_eq!(events[1].reason, None);
}

#[test]
fn test_revoke_with_colliding_event_id_changes_nothing() {
    struct SameId;
    impl IdGenerator for SameId {
        fn next_id(&self) -> String {
            "evt-same".into()
        }
    }

    let ledger = Arc::new(Ledger::in_memory());
    let contract = deterministic_contract(Arc::clone(&ledger)).with_id_generator(SameId);
    contract.issue("C1", "D1", "Diploma", "h1", "Org1").unwrap();
    let height = ledger.height().unwrap();
    let mut events = ledger.subscribe();

    let err = contract.revoke("C1", "expired", "Org1").unwrap_err();
    assert!(matches!(
        err,
        ContractError::DuplicateEvent { ref cred_id, .. } if cred_id == "C1"
    ));

    let mut tx = ledger.begin();
    assert_eq!(
        CredentialStore::get(&mut tx, "C1").unwrap().status,
        CredentialState::Active
    );
    assert_eq!(ledger.height().unwrap(), height);
    assert!(events.try_recv().is_err());
}

// =========================================================================
// Side-channel events
// =========================================================================

#[test]
fn test_commit_events_carry_audit_payload() {
    let contract = in_memory_contract();
    let mut events = contract.ledger().subscribe();

    contract.issue("C1", "D1", "Diploma", "h1", "Org1").unwrap();
    let published = events.try_recv().expect("issue publishes one event");
    assert_eq!(published.name, "AuditTrail");
    let payload: AccessEvent = serde_json::from_slice(&published.payload).unwrap();
    assert_eq!(payload.cred_id, "C1");
    assert_eq!(payload.action, AccessAction::Issue);

    assert!(contract.revoke("missing", "r", "Org1").is_err());
    assert!(contract.issue("C1", "D1", "Diploma", "h1", "Org1").is_err());
    assert!(events.try_recv().is_err(), "failed operations publish nothing");

    contract.query_audit_trail("D1", 5, "").unwrap();
    assert!(events.try_recv().is_err(), "queries publish nothing");
}

// =========================================================================
// Concurrency
// =========================================================================

#[test]
fn test_concurrent_issue_of_same_id_commits_once() {
    let ledger = Arc::new(Ledger::in_memory());
    let contract = deterministic_contract(Arc::clone(&ledger));
    let config = contract.config().clone();
    let audit = AuditTrail::new(&config);

    // Two transactions both observe that C1 is absent.
    let mut first = ledger.begin();
    let mut second = ledger.begin();
    assert!(!CredentialStore::exists(&mut first, "C1").unwrap());
    assert!(!CredentialStore::exists(&mut second, "C1").unwrap());

    let now = credtrail_integration_tests::epoch();
    let a = credtrail_core::Credential::issued("C1", "D1", "Diploma", "h1", "Org1", now);
    let b = credtrail_core::Credential::issued("C1", "D2", "Diploma", "h2", "Org2", now);
    CredentialStore::create(&mut first, &a).unwrap();
    CredentialStore::create(&mut second, &b).unwrap();
    let event_a = AccessEvent::success("e-a", &a, AccessAction::Issue, "Org1", None, now);
    let event_b = AccessEvent::success("e-b", &b, AccessAction::Issue, "Org2", None, now);
    audit.append(&mut first, &event_a).unwrap();
    audit.append(&mut second, &event_b).unwrap();

    first.commit().expect("first commit wins");
    let err = second.commit().expect_err("second commit conflicts");
    assert!(err.is_conflict());

    // The loser left nothing behind: no credential overwrite, no audit event.
    let mut tx = ledger.begin();
    assert_eq!(CredentialStore::get(&mut tx, "C1").unwrap().holder_did, "D1");
    assert!(contract.full_audit_trail("D2").unwrap().is_empty());
    assert_eq!(contract.full_audit_trail("D1").unwrap().len(), 1);
}

#[test]
fn test_parallel_verifies_from_threads() {
    let contract = Arc::new(in_memory_contract());
    contract.issue("C1", "D1", "Diploma", "h1", "Org1").unwrap();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let contract = Arc::clone(&contract);
            std::thread::spawn(move || {
                let verifier = format!("V{i}");
                // Verify reads C1 without writing it, so a conflict can only
                // come from a concurrent write to the credential.
                loop {
                    match contract.verify("C1", &verifier) {
                        Ok(result) => return result,
                        Err(err) if err.is_conflict() => continue,
                        Err(err) => panic!("verify failed: {err}"),
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap().is_active);
    }
    assert_eq!(contract.full_audit_trail("D1").unwrap().len(), 5);
}

// =========================================================================
// Holder isolation
// =========================================================================

#[test]
fn test_holders_with_shared_prefix_are_isolated() {
    let contract: CredentialContract = in_memory_contract();
    issue_many(&contract, "D1", "a-", 3);
    issue_many(&contract, "D10", "b-", 2);
    issue_many(&contract, "D1x", "c-", 1);

    let d1 = contract.full_audit_trail("D1").unwrap();
    assert_eq!(d1.len(), 3);
    assert!(d1.iter().all(|e| e.holder_did == "D1"));
    assert_eq!(contract.full_audit_trail("D10").unwrap().len(), 2);
    assert_eq!(contract.full_audit_trail("D1x").unwrap().len(), 1);
    assert!(contract.full_audit_trail("D").unwrap().is_empty());

    // The audit range never sees credential records.
    let mut tx = contract.ledger().begin();
    let key = tx
        .create_composite_key(credtrail_contract::CREDENTIAL_OBJECT_TYPE, &["a-0"])
        .unwrap();
    assert!(tx.get_state(&key).unwrap().is_some());
}

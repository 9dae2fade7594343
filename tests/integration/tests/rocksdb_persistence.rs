//! Integration test: the contract over a RocksDB-backed ledger survives a
//! restart with credentials, audit trail, bookmarks, and height intact.

use std::sync::Arc;

use credtrail_contract::ContractError;
use credtrail_core::{AccessAction, CredentialState};
use credtrail_integration_tests::{deterministic_contract, scratch_dir};
use credtrail_ledger::Ledger;

#[test]
fn test_reopen_preserves_state_and_audit_trail() {
    let dir = scratch_dir("reopen");

    let (height, bookmark) = {
        let ledger = Arc::new(Ledger::open(&dir).expect("open ledger"));
        let contract = deterministic_contract(Arc::clone(&ledger));
        contract.issue("C1", "D1", "Diploma", "h1", "Org1").unwrap();
        contract.verify("C1", "V1").unwrap();
        contract.revoke("C1", "expired", "Org1").unwrap();

        let first = contract.query_audit_trail("D1", 2, "").unwrap();
        assert_eq!(first.events.len(), 2);
        (ledger.height().unwrap(), first.bookmark)
    };
    assert_eq!(height, 3);
    assert!(!bookmark.is_empty());

    let ledger = Arc::new(Ledger::open(&dir).expect("reopen ledger"));
    assert_eq!(ledger.height().unwrap(), 3);
    // Fresh id sequence: a different prefix keeps new event ids from
    // colliding with the ones written before the restart.
    let contract = deterministic_contract(Arc::clone(&ledger))
        .with_id_generator(credtrail_core::SequentialIds::new("evt-r-"));

    // A bookmark handed out before the restart still resumes the walk.
    let rest = contract.query_audit_trail("D1", 2, &bookmark).unwrap();
    assert_eq!(rest.events.len(), 1);
    assert_eq!(rest.events[0].action, AccessAction::Revoke);
    assert!(rest.is_last());

    let err = contract.revoke("C1", "again", "Org1").unwrap_err();
    assert!(matches!(err, ContractError::AlreadyRevoked { .. }));
    let err = contract.issue("C1", "D1", "Diploma", "h1", "Org1").unwrap_err();
    assert!(matches!(err, ContractError::AlreadyExists { .. }));

    let result = contract.verify("C1", "V2").unwrap();
    assert!(!result.is_active);
    assert_eq!(ledger.height().unwrap(), 4);

    let events = contract.full_audit_trail("D1").unwrap();
    assert_eq!(events.len(), 4);
    assert_eq!(events[3].actor_id, "V2");

    drop(contract);
    drop(ledger);
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_revoked_status_persists() {
    let dir = scratch_dir("status");
    {
        let contract = deterministic_contract(Arc::new(Ledger::open(&dir).unwrap()));
        contract.issue("C7", "D7", "License", "h7", "Org7").unwrap();
        contract.revoke("C7", "", "Org7").unwrap();
    }

    let ledger = Arc::new(Ledger::open(&dir).unwrap());
    let mut tx = ledger.begin();
    let stored = credtrail_contract::CredentialStore::get(&mut tx, "C7").unwrap();
    assert_eq!(stored.status, CredentialState::Revoked);
    assert!(stored.updated_at > stored.created_at);

    drop(tx);
    drop(ledger);
    std::fs::remove_dir_all(&dir).ok();
}

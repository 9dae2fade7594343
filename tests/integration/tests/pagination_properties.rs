//! Integration property tests for audit-trail pagination.
//!
//! Following bookmarks from an empty start must visit every event of a
//! holder exactly once, in key order, whatever the page size.

use std::collections::BTreeSet;

use credtrail_contract::{ContractError, CredentialContract};
use credtrail_core::{AccessEvent, ContractConfig};
use credtrail_integration_tests::{configured_contract, in_memory_contract};
use credtrail_ledger::Ledger;
use proptest::prelude::*;
use std::sync::Arc;

/// One credential: owning holder index and how many times it gets verified.
#[derive(Debug, Clone)]
struct Plan {
    holder: usize,
    verifies: usize,
    revoked: bool,
}

// Strategy: a handful of credentials spread over up to three holders
fn arb_plans() -> impl Strategy<Value = Vec<Plan>> {
    prop::collection::vec(
        (0usize..3, 0usize..4, any::<bool>()).prop_map(|(holder, verifies, revoked)| Plan {
            holder,
            verifies,
            revoked,
        }),
        0..8,
    )
}

fn holder_did(index: usize) -> String {
    // D1 and D10 share a textual prefix on purpose.
    ["D1", "D10", "did:example:carol"][index].to_string()
}

/// Apply the plans and return the number of events each holder should have.
fn apply(contract: &CredentialContract, plans: &[Plan]) -> [usize; 3] {
    let mut expected = [0usize; 3];
    for (i, plan) in plans.iter().enumerate() {
        let cred_id = format!("C{i:02}");
        contract
            .issue(&cred_id, &holder_did(plan.holder), "Diploma", "h", "Org1")
            .unwrap();
        expected[plan.holder] += 1;
        for v in 0..plan.verifies {
            contract.verify(&cred_id, &format!("V{v}")).unwrap();
            expected[plan.holder] += 1;
        }
        if plan.revoked {
            contract.revoke(&cred_id, "expired", "Org1").unwrap();
            expected[plan.holder] += 1;
        }
    }
    expected
}

/// Walk every page; returns the pages' events and each page's length.
fn walk(contract: &CredentialContract, holder: &str, page_size: u32) -> (Vec<AccessEvent>, Vec<usize>) {
    let mut events = Vec::new();
    let mut sizes = Vec::new();
    let mut bookmark = String::new();
    loop {
        let page = contract
            .query_audit_trail(holder, page_size, &bookmark)
            .unwrap();
        sizes.push(page.events.len());
        events.extend(page.events);
        if page.bookmark.is_empty() {
            return (events, sizes);
        }
        bookmark = page.bookmark;
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Property: the union of all pages is exactly the holder's event set
    #[test]
    fn proptest_pages_cover_holder_exactly_once(
        plans in arb_plans(),
        page_size in 1u32..10,
    ) {
        let contract = in_memory_contract();
        let expected = apply(&contract, &plans);

        for (index, count) in expected.iter().enumerate() {
            let holder = holder_did(index);
            let (events, sizes) = walk(&contract, &holder, page_size);

            prop_assert_eq!(events.len(), *count);
            prop_assert!(events.iter().all(|e| e.holder_did == holder));

            let distinct: BTreeSet<&str> = events.iter().map(|e| e.event_id.as_str()).collect();
            prop_assert_eq!(distinct.len(), events.len());

            // Paged order equals single-page order.
            let single = contract.query_audit_trail(&holder, 1000, "").unwrap();
            prop_assert!(single.is_last());
            prop_assert_eq!(&single.events, &events);

            // Every page but the last is full; the last is never over-full.
            if let Some((last, full)) = sizes.split_last() {
                prop_assert!(full.iter().all(|s| *s == page_size as usize));
                prop_assert!(*last <= page_size as usize);
            }
        }
    }

    /// Property: requests above the configured maximum are clamped, not rejected
    #[test]
    fn proptest_oversized_pages_are_clamped(
        count in 1usize..12,
        max_page_size in 1u32..5,
        requested in 5u32..5000,
    ) {
        let config = ContractConfig { max_page_size, ..ContractConfig::default() };
        let contract = configured_contract(Arc::new(Ledger::in_memory()), config);
        for i in 0..count {
            contract.issue(&format!("C{i}"), "D1", "Diploma", "h", "Org1").unwrap();
        }

        let page = contract.query_audit_trail("D1", requested, "").unwrap();
        prop_assert_eq!(page.events.len(), count.min(max_page_size as usize));
        prop_assert_eq!(page.is_last(), count <= max_page_size as usize);
    }
}

#[test]
fn test_bookmark_from_other_holder_is_rejected() {
    let contract = in_memory_contract();
    for i in 0..3 {
        contract.issue(&format!("A{i}"), "D1", "Diploma", "h", "Org1").unwrap();
        contract.issue(&format!("B{i}"), "D2", "Diploma", "h", "Org1").unwrap();
    }

    let d2 = contract.query_audit_trail("D2", 1, "").unwrap();
    assert!(!d2.bookmark.is_empty());

    let err = contract
        .query_audit_trail("D1", 1, &d2.bookmark)
        .expect_err("foreign bookmark must be rejected");
    assert!(matches!(err, ContractError::InvalidBookmark { .. }));
    assert!(err.is_validation());
}

#[test]
fn test_garbage_bookmark_is_rejected() {
    let contract = in_memory_contract();
    contract.issue("C1", "D1", "Diploma", "h", "Org1").unwrap();

    for bookmark in ["not base64 !!", "AAAA"] {
        let err = contract.query_audit_trail("D1", 5, bookmark).unwrap_err();
        assert!(
            matches!(err, ContractError::InvalidBookmark { .. }),
            "bookmark {bookmark:?} gave {err}"
        );
    }
}

#[test]
fn test_page_size_one_yields_consecutive_distinct_events() {
    let contract = in_memory_contract();
    contract.issue("C1", "D1", "Diploma", "h1", "Org1").unwrap();
    contract.verify("C1", "V1").unwrap();

    let first = contract.query_audit_trail("D1", 1, "").unwrap();
    assert_eq!(first.events.len(), 1);
    let second = contract.query_audit_trail("D1", 1, &first.bookmark).unwrap();
    assert_eq!(second.events.len(), 1);
    assert_ne!(first.events[0].event_id, second.events[0].event_id);
    assert!(second.is_last());
}

#[test]
fn test_empty_holder_has_single_empty_page() {
    let contract = in_memory_contract();
    let page = contract.query_audit_trail("nobody", 10, "").unwrap();
    assert!(page.events.is_empty());
    assert!(page.is_last());
}

//! Credtrail Contract — credential lifecycle and audit trail over a ledger.
//!
//! [`CredentialContract`] exposes Issue, Verify, Revoke, and QueryAuditTrail.
//! Each runs in one ledger transaction composed from the [`CredentialStore`]
//! and the [`AuditTrail`].

pub mod audit;
pub mod contract;
pub mod error;
pub mod store;
pub mod verification;

pub use audit::{AuditPage, AuditTrail, AUDIT_OBJECT_TYPE};
pub use contract::CredentialContract;
pub use error::ContractError;
pub use store::{CredentialStore, CREDENTIAL_OBJECT_TYPE};
pub use verification::{HashCheck, PlaceholderHashCheck};

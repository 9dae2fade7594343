//! Content-hash checking seam.
//!
//! The ledger only stores `hashed_data`; comparing it to the off-chain
//! credential payload is the job of an external collaborator plugged in via
//! [`HashCheck`].

use credtrail_core::Credential;

/// Decides whether the off-chain payload of a credential still hashes to its
/// on-ledger `hashed_data`.
pub trait HashCheck: Send + Sync {
    fn matches(&self, credential: &Credential) -> bool;
}

/// Stand-in used until an off-chain verifier is wired up. Reports every
/// credential as matching without inspecting anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderHashCheck;

impl HashCheck for PlaceholderHashCheck {
    fn matches(&self, _credential: &Credential) -> bool {
        true
    }
}

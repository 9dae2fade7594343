use std::fmt;

use crate::error::CoreError;
use crate::types::AccessAction;

/// The states of an on-ledger credential record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum CredentialState {
    /// Credential is valid and can be presented to verifiers.
    Active,
    /// Credential has been permanently revoked. Final state.
    Revoked,
}

impl CredentialState {
    /// Whether this is a final (terminal) state.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Revoked)
    }

    /// Whether a verifier should treat the credential as usable.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for CredentialState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::Revoked => write!(f, "Revoked"),
        }
    }
}

/// Manages credential state transitions.
///
/// Valid transitions:
/// - (none) → Active (Issue)
/// - Active → Active (Verify)
/// - Revoked → Revoked (Verify)
/// - Active → Revoked (Revoke)
///
/// Nothing leaves `Revoked`, and `Issue` never applies to an existing record.
pub struct CredentialStateMachine;

impl CredentialStateMachine {
    /// The state a freshly issued credential starts in.
    pub fn initial() -> CredentialState {
        CredentialState::Active
    }

    /// Attempt a state transition driven by an access action.
    /// Returns the new state on success, or an error for invalid transitions.
    pub fn transition(
        current: CredentialState,
        action: AccessAction,
    ) -> Result<CredentialState, CoreError> {
        let new_state = match (current, action) {
            // Reads never move the record
            (state, AccessAction::Verify) => state,

            (CredentialState::Active, AccessAction::Revoke) => CredentialState::Revoked,

            // Issue applies only to absent records; Revoked is terminal
            (_, AccessAction::Issue) | (CredentialState::Revoked, AccessAction::Revoke) => {
                return Err(CoreError::InvalidStateTransition {
                    from: current,
                    event: action,
                });
            }
        };

        tracing::debug!(
            from = %current,
            to = %new_state,
            action = %action,
            "credential state transition"
        );

        Ok(new_state)
    }

    /// Check if a transition is valid without performing it.
    pub fn can_transition(current: CredentialState, action: AccessAction) -> bool {
        Self::transition(current, action).is_ok()
    }
}

use crate::credential_state::CredentialState;
use crate::types::AccessAction;

/// Core protocol errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid state transition: {event} is not allowed from {from}")]
    InvalidStateTransition {
        from: CredentialState,
        event: AccessAction,
    },

    #[error("validation error: {0}")]
    ValidationError(String),
}

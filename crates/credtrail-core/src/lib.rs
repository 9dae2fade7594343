//! Credtrail Core — Credential and audit-event types, the credential
//! state machine, injected time/id capabilities, and contract configuration.

pub mod clock;
pub mod config;
pub mod credential_state;
pub mod error;
pub mod types;

pub use clock::{
    Clock, FixedClock, IdGenerator, SequentialIds, SteppingClock, SystemClock, UuidV7Ids,
};
pub use config::ContractConfig;
pub use credential_state::{CredentialState, CredentialStateMachine};
pub use error::CoreError;
pub use types::{AccessAction, AccessEvent, AccessOutcome, Credential, VerificationResult};

//! `credtrail revoke` — Permanently revoke a credential.

use clap::Args;
use credtrail_contract::CredentialContract;
use credtrail_core::Credential;

#[derive(Args, Debug)]
pub struct RevokeArgs {
    /// Credential to revoke.
    #[arg(long)]
    pub cred_id: String,

    /// Reason recorded in the audit trail.
    #[arg(short, long, default_value = "")]
    pub reason: String,

    /// Identifier of the revoking party.
    #[arg(long)]
    pub revoker: String,
}

pub fn run(args: &RevokeArgs, contract: &CredentialContract) -> anyhow::Result<Credential> {
    Ok(contract.revoke(&args.cred_id, &args.reason, &args.revoker)?)
}

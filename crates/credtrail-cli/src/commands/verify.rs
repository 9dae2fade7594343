//! `credtrail verify` — Verify a credential and record the access.

use clap::Args;
use credtrail_contract::CredentialContract;
use credtrail_core::VerificationResult;

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Credential to verify.
    #[arg(long)]
    pub cred_id: String,

    /// Identifier of the verifying party.
    #[arg(long)]
    pub verifier: String,
}

pub fn run(args: &VerifyArgs, contract: &CredentialContract) -> anyhow::Result<VerificationResult> {
    Ok(contract.verify(&args.cred_id, &args.verifier)?)
}

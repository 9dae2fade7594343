//! `credtrail issue` — Issue a credential.

use clap::Args;
use credtrail_contract::CredentialContract;
use credtrail_core::Credential;

#[derive(Args, Debug)]
pub struct IssueArgs {
    /// Identifier of the new credential.
    #[arg(long)]
    pub cred_id: String,

    /// DID of the credential holder.
    #[arg(long)]
    pub holder: String,

    /// Credential type (e.g. Diploma).
    #[arg(short = 't', long)]
    pub cred_type: String,

    /// Hash of the off-chain credential payload.
    #[arg(long)]
    pub hashed_data: String,

    /// Identifier of the issuing organisation.
    #[arg(long)]
    pub issuer: String,
}

pub fn run(args: &IssueArgs, contract: &CredentialContract) -> anyhow::Result<Credential> {
    let credential = contract.issue(
        &args.cred_id,
        &args.holder,
        &args.cred_type,
        &args.hashed_data,
        &args.issuer,
    )?;
    Ok(credential)
}

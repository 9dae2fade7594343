//! `credtrail audit` — Page through a holder's audit trail.

use clap::Args;
use credtrail_contract::{AuditPage, CredentialContract};

#[derive(Args, Debug)]
pub struct AuditArgs {
    /// Holder DID whose events to list.
    #[arg(long)]
    pub holder: String,

    /// Events per page (defaults to the configured page size).
    #[arg(short = 'n', long)]
    pub page_size: Option<u32>,

    /// Bookmark returned by a previous page.
    #[arg(short, long, default_value = "")]
    pub bookmark: String,

    /// Follow bookmarks and print every event in one page.
    #[arg(long)]
    pub all: bool,
}

pub fn run(args: &AuditArgs, contract: &CredentialContract) -> anyhow::Result<AuditPage> {
    let page_size = contract.config().effective_page_size(args.page_size);

    if !args.all {
        return Ok(contract.query_audit_trail(&args.holder, page_size, &args.bookmark)?);
    }

    let mut events = Vec::new();
    let mut bookmark = args.bookmark.clone();
    loop {
        let page = contract.query_audit_trail(&args.holder, page_size, &bookmark)?;
        events.extend(page.events);
        if page.bookmark.is_empty() {
            break;
        }
        bookmark = page.bookmark;
    }
    tracing::debug!(holder = %args.holder, events = events.len(), "collected full audit trail");
    Ok(AuditPage {
        events,
        bookmark: String::new(),
    })
}

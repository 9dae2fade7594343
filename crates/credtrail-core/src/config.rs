use serde::{Deserialize, Serialize};

/// Tunables for the credential contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractConfig {
    /// Page size used when a caller does not ask for one.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    /// Upper bound for a single audit-trail page; larger requests are clamped.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
    /// Name under which audit events are emitted on the ledger side channel.
    #[serde(default = "default_audit_event_name")]
    pub audit_event_name: String,
}

fn default_page_size() -> u32 {
    20
}
fn default_max_page_size() -> u32 {
    1000
}
fn default_audit_event_name() -> String {
    "AuditTrail".into()
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            audit_event_name: default_audit_event_name(),
        }
    }
}

impl ContractConfig {
    /// Clamp a requested page size into `1..=max_page_size`, substituting the
    /// default for `None`. A request of zero is returned as zero so callers
    /// can reject it.
    pub fn effective_page_size(&self, requested: Option<u32>) -> u32 {
        match requested {
            None => self.default_page_size.clamp(1, self.max_page_size.max(1)),
            Some(0) => 0,
            Some(n) => n.min(self.max_page_size.max(1)),
        }
    }
}

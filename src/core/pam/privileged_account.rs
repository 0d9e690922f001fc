use chrono::{DateTime, Utc};

/// A privileged account tracked for checkout (spec §4.7): a straightforward
/// registry entry, not a credential itself — the secret lives in a
/// `CredentialVault` entry keyed by `vault_entry_id`.
#[derive(Debug, Clone)]
pub struct PrivilegedAccount {
    pub id: String,
    pub name: String,
    pub system: String,
    pub vault_entry_id: String,
    pub requires_approval: bool,
    pub max_checkout_minutes: u32,
    pub created_at: DateTime<Utc>,
}

impl PrivilegedAccount {
    pub fn new(id: impl Into<String>, name: impl Into<String>, system: impl Into<String>, vault_entry_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            system: system.into(),
            vault_entry_id: vault_entry_id.into(),
            requires_approval: false,
            max_checkout_minutes: 60,
            created_at: now,
        }
    }
}

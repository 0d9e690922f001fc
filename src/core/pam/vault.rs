use crate::core::credentials::StoredCredential;
use chrono::{DateTime, Utc};

/// One vaulted secret. The secret itself is opaque; callers interact with it
/// only through a `StoredCredential` handle, never a raw value.
#[derive(Debug, Clone)]
pub struct CredentialVault {
    pub id: String,
    pub privileged_account_id: String,
    pub secret: StoredCredential,
    pub last_rotated_at: DateTime<Utc>,
}

impl CredentialVault {
    pub fn new(id: impl Into<String>, privileged_account_id: impl Into<String>, secret: StoredCredential, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            privileged_account_id: privileged_account_id.into(),
            secret,
            last_rotated_at: now,
        }
    }

    pub fn rotate(&mut self, secret: StoredCredential, now: DateTime<Utc>) {
        self.secret = secret;
        self.last_rotated_at = now;
    }
}

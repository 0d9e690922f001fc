use crate::core::credentials::StoredCredential;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialRecordStatus {
    Active,
    Rotated,
    Expired,
}

/// A credential bound to an identity, tracking rotation history per
/// `CredentialPolicy::history_size`/`rotation_interval_days`.
pub struct CredentialRecord {
    pub id: String,
    pub identity_id: String,
    pub stored: StoredCredential,
    pub status: CredentialRecordStatus,
    pub created_at: DateTime<Utc>,
    pub rotated_at: Option<DateTime<Utc>>,
}

impl CredentialRecord {
    pub fn new(
        id: impl Into<String>,
        identity_id: impl Into<String>,
        stored: StoredCredential,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            identity_id: identity_id.into(),
            stored,
            status: CredentialRecordStatus::Active,
            created_at: now,
            rotated_at: None,
        }
    }

    pub fn days_since_rotation(&self, reference: DateTime<Utc>) -> u32 {
        let anchor = self.rotated_at.unwrap_or(self.created_at);
        (reference - anchor).num_days().max(0) as u32
    }
}

impl std::fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("id", &self.id)
            .field("identity_id", &self.identity_id)
            .field("status", &self.status)
            .finish()
    }
}

impl Clone for CredentialRecord {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            identity_id: self.identity_id.clone(),
            stored: self.stored.clone(),
            status: self.status,
            created_at: self.created_at,
            rotated_at: self.rotated_at,
        }
    }
}

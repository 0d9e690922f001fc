use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleAssignmentStatus {
    Active,
    Revoked,
    Expired,
}

/// A grant of a role to an identity. Expired assignments are lazily
/// demoted to `Expired` on read (spec §3), not by a background sweep.
#[derive(Debug, Clone)]
pub struct RoleAssignment {
    pub id: String,
    pub identity_id: String,
    pub role_id: String,
    pub scope: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub status: RoleAssignmentStatus,
    pub granted_by: String,
    pub granted_at: DateTime<Utc>,
}

impl RoleAssignment {
    pub fn is_effective(&self, reference: DateTime<Utc>) -> bool {
        self.status == RoleAssignmentStatus::Active
            && self.expires_at.map(|exp| reference < exp).unwrap_or(true)
    }

    pub fn is_expired(&self, reference: DateTime<Utc>) -> bool {
        self.expires_at.map(|exp| reference >= exp).unwrap_or(false)
    }
}

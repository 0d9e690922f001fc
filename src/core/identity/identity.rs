//! The `Identity` aggregate: a principal (user, service, device, or group)
//! that the rest of the core reasons about by opaque id.
//!
//! # Responsibility
//!
//! `Identity` answers "who/what is this principal and what state is it in?".
//! It does not know about credentials, roles, or sessions — those are
//! owned by other subsystems and reference an identity only by id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityType {
    User,
    Service,
    Device,
    Group,
}

/// Lifecycle status of an identity.
///
/// Suspension and locking are reversible; deprovisioned and deleted are
/// terminal (no operation in this crate transitions out of them).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityStatus {
    Active,
    Inactive,
    Suspended,
    Locked,
    Pending,
    Deprovisioned,
    Deleted,
}

impl IdentityStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Deprovisioned | Self::Deleted)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub identity_type: IdentityType,
    pub status: IdentityStatus,
    pub username: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub organization_id: Option<String>,
    pub group_ids: BTreeSet<String>,
    /// Coarse trust level assigned during provisioning/verification
    /// (e.g. "unverified", "email-verified", "identity-proofed").
    pub verification_level: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identity {
    pub fn new(
        id: impl Into<String>,
        identity_type: IdentityType,
        username: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            identity_type,
            status: IdentityStatus::Active,
            username: username.into(),
            email: None,
            display_name: None,
            organization_id: None,
            group_ids: BTreeSet::new(),
            verification_level: "unverified".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == IdentityStatus::Active
    }

    pub fn is_usable(&self) -> bool {
        matches!(self.status, IdentityStatus::Active | IdentityStatus::Pending)
    }
}

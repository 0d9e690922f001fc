//! Session Manager domain types.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    Expired,
    Revoked,
}

/// A logged-in session, bound optionally to a device/IP and subject to a
/// max-concurrent-sessions-per-identity limit supplied by `SessionConfig`.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub identity_id: String,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub device_fingerprint: Option<String>,
    pub ip_address: Option<String>,
}

impl Session {
    pub fn is_expired(&self, reference: DateTime<Utc>) -> bool {
        reference >= self.expires_at
    }

    pub fn is_active(&self, reference: DateTime<Utc>) -> bool {
        self.status == SessionStatus::Active && !self.is_expired(reference)
    }
}

/// Session-related configuration, part of the orchestrator seed config.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub default_ttl: chrono::Duration,
    pub max_concurrent_sessions: Option<usize>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_ttl: chrono::Duration::hours(8),
            max_concurrent_sessions: Some(5),
        }
    }
}

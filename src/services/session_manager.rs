//! Session Manager: session lifecycle, expiry, revocation (spec §2
//! subsystem 5).

use crate::core::clock::Clock;
use crate::core::error::{IamError, IamResult};
use crate::core::session::{Session, SessionConfig, SessionStatus};
use crate::event::{IamEvent, ListenerRegistry};
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct SessionManager {
    sessions: Arc<DashMap<String, Session>>,
    by_identity: Arc<DashMap<String, Vec<String>>>,
    config: SessionConfig,
    clock: Arc<dyn Clock>,
    pub listeners: ListenerRegistry,
}

impl SessionManager {
    pub fn new(config: SessionConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            by_identity: Arc::new(DashMap::new()),
            config,
            clock,
            listeners: ListenerRegistry::new(),
        }
    }

    fn emit(&self, name: &str, session_id: &str) {
        let mut payload = BTreeMap::new();
        payload.insert("sessionId".to_string(), session_id.to_string().into());
        self.listeners.dispatch(&IamEvent::new(name, payload, self.clock.now()));
    }

    /// Create a session, evicting the oldest active session for the
    /// identity when `max_concurrent_sessions` would otherwise be exceeded.
    pub fn create_session(&self, id: impl Into<String>, identity_id: impl Into<String>, device_fingerprint: Option<String>, ip_address: Option<String>) -> Session {
        let now = self.clock.now();
        let identity_id = identity_id.into();
        let id = id.into();
        let session = Session {
            id: id.clone(),
            identity_id: identity_id.clone(),
            status: SessionStatus::Active,
            created_at: now,
            expires_at: now + self.config.default_ttl,
            device_fingerprint,
            ip_address,
        };
        self.sessions.insert(id.clone(), session.clone());

        let mut active_ids = self.by_identity.entry(identity_id).or_default();
        active_ids.push(id.clone());
        if let Some(max) = self.config.max_concurrent_sessions {
            while active_ids.len() > max {
                let evicted_id = active_ids.remove(0);
                if let Some(mut evicted) = self.sessions.get_mut(&evicted_id) {
                    evicted.status = SessionStatus::Revoked;
                }
            }
        }
        drop(active_ids);
        self.emit("sessionCreated", &id);
        session
    }

    pub fn get_session(&self, id: &str) -> IamResult<Session> {
        let mut entry = self.sessions.get_mut(id).ok_or_else(|| IamError::not_found("Session", id))?;
        if entry.status == SessionStatus::Active && entry.is_expired(self.clock.now()) {
            entry.status = SessionStatus::Expired;
        }
        Ok(entry.value().clone())
    }

    pub fn revoke_session(&self, id: &str) -> IamResult<()> {
        let mut entry = self.sessions.get_mut(id).ok_or_else(|| IamError::not_found("Session", id))?;
        entry.status = SessionStatus::Revoked;
        drop(entry);
        self.emit("sessionRevoked", id);
        Ok(())
    }

    pub fn revoke_all_for_identity(&self, identity_id: &str) {
        if let Some(ids) = self.by_identity.get(identity_id) {
            for id in ids.value().clone() {
                let _ = self.revoke_session(&id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::FixedClock;
    use chrono::Utc;

    fn manager() -> SessionManager {
        SessionManager::new(SessionConfig::default(), Arc::new(FixedClock::new(Utc::now())))
    }

    #[test]
    fn create_then_revoke() {
        let manager = manager();
        manager.create_session("s1", "u1", None, None);
        manager.revoke_session("s1").unwrap();
        assert_eq!(manager.get_session("s1").unwrap().status, SessionStatus::Revoked);
    }

    #[test]
    fn exceeding_max_concurrent_evicts_oldest() {
        let config = SessionConfig {
            default_ttl: chrono::Duration::hours(8),
            max_concurrent_sessions: Some(2),
        };
        let manager = SessionManager::new(config, Arc::new(FixedClock::new(Utc::now())));
        manager.create_session("s1", "u1", None, None);
        manager.create_session("s2", "u1", None, None);
        manager.create_session("s3", "u1", None, None);

        assert_eq!(manager.get_session("s1").unwrap().status, SessionStatus::Revoked);
        assert_eq!(manager.get_session("s3").unwrap().status, SessionStatus::Active);
    }
}

//! Credential Manager: password policy enforcement, credential records,
//! rotation (spec §2 subsystem 2).

use crate::adapters::crypto::password_hash::PasswordHasher;
use crate::core::clock::Clock;
use crate::core::credentials::{CredentialPolicy, CredentialRecord, CredentialRecordStatus, RawCredential};
use crate::core::error::{IamError, IamResult};
use crate::event::{IamEvent, ListenerRegistry};
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

pub struct CredentialManager {
    records: Arc<DashMap<String, CredentialRecord>>,
    by_identity: Arc<DashMap<String, String>>,
    policy: RwLock<CredentialPolicy>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
    pub listeners: ListenerRegistry,
}

impl CredentialManager {
    pub fn new(policy: CredentialPolicy, hasher: Arc<dyn PasswordHasher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            records: Arc::new(DashMap::new()),
            by_identity: Arc::new(DashMap::new()),
            policy: RwLock::new(policy),
            hasher,
            clock,
            listeners: ListenerRegistry::new(),
        }
    }

    fn emit(&self, name: &str, identity_id: &str) {
        let mut payload = BTreeMap::new();
        payload.insert("id".to_string(), identity_id.to_string().into());
        self.listeners.dispatch(&IamEvent::new(name, payload, self.clock.now()));
    }

    /// Replace the active password policy (spec §6 seed config).
    pub fn set_policy(&self, policy: CredentialPolicy) {
        *self.policy.write().expect("credential policy lock poisoned") = policy;
    }

    pub fn set_credential(&self, id: impl Into<String>, identity_id: impl Into<String>, raw: &RawCredential) -> IamResult<CredentialRecord> {
        self.policy.read().expect("credential policy lock poisoned").validate_raw(raw).map_err(|e| IamError::InvalidInput(e))?;
        let identity_id = identity_id.into();
        let stored = self.hasher.hash(raw.secret());
        let id = id.into();
        let record = CredentialRecord::new(id.clone(), identity_id.clone(), stored, self.clock.now());
        self.records.insert(id.clone(), record.clone());
        self.by_identity.insert(identity_id.clone(), id);
        self.emit("credentialSet", &identity_id);
        Ok(record)
    }

    pub fn verify_credential(&self, identity_id: &str, raw: &str) -> bool {
        let Some(record_id) = self.by_identity.get(identity_id).map(|e| e.value().clone()) else {
            return false;
        };
        let Some(record) = self.records.get(&record_id) else {
            return false;
        };
        if record.status != CredentialRecordStatus::Active {
            return false;
        }
        self.hasher.verify(raw, &record.stored)
    }

    pub fn rotate(&self, identity_id: &str, new_id: impl Into<String>, raw: &RawCredential) -> IamResult<CredentialRecord> {
        self.policy.read().expect("credential policy lock poisoned").validate_raw(raw).map_err(|e| IamError::InvalidInput(e))?;
        if let Some(old_id) = self.by_identity.get(identity_id).map(|e| e.value().clone()) {
            if let Some(mut old) = self.records.get_mut(&old_id) {
                old.status = CredentialRecordStatus::Rotated;
                old.rotated_at = Some(self.clock.now());
            }
        }
        let record = self.set_credential(new_id, identity_id, raw)?;
        self.emit("credentialRotated", identity_id);
        Ok(record)
    }

    pub fn is_rotation_due(&self, identity_id: &str) -> IamResult<bool> {
        let record_id = self
            .by_identity
            .get(identity_id)
            .map(|e| e.value().clone())
            .ok_or_else(|| IamError::not_found("CredentialRecord", identity_id))?;
        let record = self.records.get(&record_id).ok_or_else(|| IamError::not_found("CredentialRecord", &record_id))?;
        let policy = self.policy.read().expect("credential policy lock poisoned");
        Ok(policy.is_rotation_due(record.days_since_rotation(self.clock.now())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::crypto::password_hash::Argon2PasswordHasher;
    use crate::core::clock::FixedClock;
    use chrono::Utc;

    fn manager() -> CredentialManager {
        CredentialManager::new(
            CredentialPolicy::default(),
            Arc::new(Argon2PasswordHasher::default()),
            Arc::new(FixedClock::new(Utc::now())),
        )
    }

    #[test]
    fn set_then_verify_round_trips() {
        let manager = manager();
        let raw = RawCredential::new("correct-horse-battery");
        manager.set_credential("c1", "u1", &raw).unwrap();
        assert!(manager.verify_credential("u1", "correct-horse-battery"));
        assert!(!manager.verify_credential("u1", "wrong"));
    }

    #[test]
    fn rotated_credential_no_longer_verifies() {
        let manager = manager();
        let raw = RawCredential::new("correct-horse-battery");
        manager.set_credential("c1", "u1", &raw).unwrap();
        let new_raw = RawCredential::new("new-horse-battery");
        manager.rotate("u1", "c2", &new_raw).unwrap();
        assert!(!manager.verify_credential("u1", "correct-horse-battery"));
        assert!(manager.verify_credential("u1", "new-horse-battery"));
    }
}

//! Security Service: cross-cutting `IAMAccessControl` policies, field
//! masking, and the append-only audit log (spec §2 subsystem 10, §4.7).

use crate::adapters::crypto::nonce::new_id;
use crate::core::clock::Clock;
use crate::core::security::{evaluate_access, mask_fields, AuditEntry, AuditFilter, AuditLogBuffer, IamAccessPolicy, MaskingRule};
use crate::event::{IamEvent, ListenerRegistry};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

pub struct SecurityService {
    access_policies: RwLock<Vec<IamAccessPolicy>>,
    masking_rules: RwLock<Vec<MaskingRule>>,
    audit_log: RwLock<AuditLogBuffer>,
    audit_enabled: bool,
    clock: Arc<dyn Clock>,
    pub listeners: ListenerRegistry,
}

impl SecurityService {
    pub fn new(audit_enabled: bool, clock: Arc<dyn Clock>) -> Self {
        Self {
            access_policies: RwLock::new(Vec::new()),
            masking_rules: RwLock::new(Vec::new()),
            audit_log: RwLock::new(AuditLogBuffer::default()),
            audit_enabled,
            clock,
            listeners: ListenerRegistry::new(),
        }
    }

    fn emit(&self, name: &str, id: &str) {
        let mut payload = BTreeMap::new();
        payload.insert("id".to_string(), id.to_string().into());
        self.listeners.dispatch(&IamEvent::new(name, payload, self.clock.now()));
    }

    pub fn register_access_policy(&self, policy: IamAccessPolicy) {
        let id = policy.id.clone();
        self.access_policies.write().expect("access policy lock poisoned").push(policy);
        self.emit("accessPolicyRegistered", &id);
    }

    pub fn register_masking_rule(&self, rule: MaskingRule) {
        let id = rule.id.clone();
        self.masking_rules.write().expect("masking rule lock poisoned").push(rule);
        self.emit("maskingRuleRegistered", &id);
    }

    pub fn evaluate(&self, subject: &str, action: &str, resource: &str) -> bool {
        let policies = self.access_policies.read().expect("access policy lock poisoned");
        evaluate_access(&policies, subject, action, resource)
    }

    pub fn mask(&self, fields: &[(String, String)]) -> Vec<(String, String)> {
        let rules = self.masking_rules.read().expect("masking rule lock poisoned");
        mask_fields(&rules, fields)
    }

    /// Append an audit entry, unless audit logging is disabled. `id` and
    /// `timestamp` are assigned here, never by the caller (spec §4.7).
    pub fn record_audit_entry(&self, action: impl Into<String>, actor_id: impl Into<String>, success: bool, detail: Option<String>) {
        if !self.audit_enabled {
            return;
        }
        let entry = AuditEntry {
            id: new_id(),
            timestamp: self.clock.now(),
            action: action.into(),
            actor_id: actor_id.into(),
            success,
            detail,
        };
        let id = entry.id.clone();
        self.audit_log.write().expect("audit log lock poisoned").append(entry);
        self.emit("auditEntryRecorded", &id);
    }

    pub fn query_audit_log(&self, filter: &AuditFilter) -> Vec<AuditEntry> {
        self.audit_log.read().expect("audit log lock poisoned").query(filter)
    }

    pub fn audit_log_len(&self) -> usize {
        self.audit_log.read().expect("audit log lock poisoned").len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::authorization::Effect;
    use crate::core::clock::FixedClock;
    use crate::core::security::MaskingStrategy;
    use chrono::Utc;

    fn service(audit_enabled: bool) -> SecurityService {
        SecurityService::new(audit_enabled, Arc::new(FixedClock::new(Utc::now())))
    }

    #[test]
    fn deny_policy_overrides_allow() {
        let service = service(true);
        service.register_access_policy(IamAccessPolicy::new("p1", vec!["*".to_string()], vec!["read".to_string()], vec!["^orders$".to_string()], Effect::Allow));
        service.register_access_policy(IamAccessPolicy::new("p2", vec!["u1".to_string()], vec!["read".to_string()], vec!["^orders$".to_string()], Effect::Deny));
        assert!(!service.evaluate("u1", "read", "orders"));
        assert!(service.evaluate("u2", "read", "orders"));
    }

    #[test]
    fn masking_applies_first_matching_rule() {
        let service = service(true);
        service.register_masking_rule(MaskingRule::new("r1", "^ssn$", MaskingStrategy::Full));
        let masked = service.mask(&[("ssn".to_string(), "123-45-6789".to_string())]);
        assert_eq!(masked[0].1, "****");
    }

    #[test]
    fn disabled_audit_logging_records_nothing() {
        let service = service(false);
        service.record_audit_entry("login", "u1", true, None);
        assert_eq!(service.audit_log_len(), 0);
    }

    #[test]
    fn enabled_audit_logging_is_queryable() {
        let service = service(true);
        service.record_audit_entry("login", "u1", true, None);
        let results = service.query_audit_log(&AuditFilter {
            actor: Some("u1".to_string()),
            ..Default::default()
        });
        assert_eq!(results.len(), 1);
    }
}

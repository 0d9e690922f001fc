use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SodViolationStatus {
    Detected,
    Acknowledged,
    Remediated,
    Exempted,
}

/// An exemption for one identity against one policy, active iff not expired.
#[derive(Debug, Clone)]
pub struct SodExemption {
    pub identity_id: String,
    pub policy_id: String,
    pub reason: String,
    pub granted_by: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl SodExemption {
    pub fn is_active(&self, reference: DateTime<Utc>) -> bool {
        match self.expires_at {
            None => true,
            Some(expiry) => reference < expiry,
        }
    }
}

/// A pair of roles that must not both be held by the same identity.
#[derive(Debug, Clone)]
pub struct SodPolicy {
    pub id: String,
    pub name: String,
    pub enabled: bool,
    pub conflicting_role_pairs: Vec<(String, String)>,
}

impl SodPolicy {
    pub fn new(id: impl Into<String>, name: impl Into<String>, conflicting_role_pairs: Vec<(String, String)>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            enabled: true,
            conflicting_role_pairs,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SodViolation {
    pub id: String,
    pub identity_id: String,
    pub policy_id: String,
    pub role_a: String,
    pub role_b: String,
    pub status: SodViolationStatus,
    pub detected_at: DateTime<Utc>,
}

impl SodViolation {
    pub fn new(id: impl Into<String>, identity_id: impl Into<String>, policy_id: impl Into<String>, role_a: impl Into<String>, role_b: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            identity_id: identity_id.into(),
            policy_id: policy_id.into(),
            role_a: role_a.into(),
            role_b: role_b.into(),
            status: SodViolationStatus::Detected,
            detected_at: now,
        }
    }
}

/// `evaluateSoD(identity, proposedRole)`: for every enabled policy, for every
/// conflicting role pair where `proposed_role` is one side and `held_roles`
/// contains the other, and the identity is not exempt, emit a violation.
pub fn evaluate_sod(
    identity_id: &str,
    proposed_role: &str,
    held_roles: &BTreeSet<String>,
    policies: &[SodPolicy],
    exemptions: &[SodExemption],
    id_factory: impl Fn() -> String,
    now: DateTime<Utc>,
) -> Vec<SodViolation> {
    let mut violations = Vec::new();
    for policy in policies.iter().filter(|p| p.enabled) {
        if is_exempt(identity_id, &policy.id, exemptions, now) {
            continue;
        }
        for (a, b) in &policy.conflicting_role_pairs {
            let other = if a == proposed_role {
                Some(b)
            } else if b == proposed_role {
                Some(a)
            } else {
                None
            };
            if let Some(other_role) = other {
                if held_roles.contains(other_role) {
                    violations.push(SodViolation::new(id_factory(), identity_id, &policy.id, a, b, now));
                }
            }
        }
    }
    violations
}

/// `evaluateAllSoD(identity, currentRoles)`: checks every pair already held
/// and reports role conflicts. Permission conflicts across held roles are
/// not emitted here — see DESIGN.md for the open-question resolution.
pub fn evaluate_all_sod(
    identity_id: &str,
    current_roles: &BTreeSet<String>,
    policies: &[SodPolicy],
    exemptions: &[SodExemption],
    id_factory: impl Fn() -> String,
    now: DateTime<Utc>,
) -> Vec<SodViolation> {
    let mut violations = Vec::new();
    for policy in policies.iter().filter(|p| p.enabled) {
        if is_exempt(identity_id, &policy.id, exemptions, now) {
            continue;
        }
        for (a, b) in &policy.conflicting_role_pairs {
            if current_roles.contains(a) && current_roles.contains(b) {
                violations.push(SodViolation::new(id_factory(), identity_id, &policy.id, a, b, now));
            }
        }
    }
    violations
}

fn is_exempt(identity_id: &str, policy_id: &str, exemptions: &[SodExemption], now: DateTime<Utc>) -> bool {
    exemptions
        .iter()
        .any(|e| e.identity_id == identity_id && e.policy_id == policy_id && e.is_active(now))
}

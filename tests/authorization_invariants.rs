//! Cross-cutting properties of the Authorization Engine (spec §8): deny
//! overrides allow regardless of match order, role hierarchy resolution is
//! cycle-safe, and the decision cache never serves a decision computed
//! before the policy set changed.

use chrono::Utc;
use iam_core::core::authorization::{AccessPolicy, AuthorizationRequest, Effect, Permission, ResourceSelector, Role, SubjectSelector};
use iam_core::core::clock::FixedClock;
use iam_core::services::{AuthorizationContext, AuthorizationEngine};
use std::sync::Arc;

fn engine() -> AuthorizationEngine {
    AuthorizationEngine::new(Arc::new(FixedClock::new(Utc::now())))
}

#[test]
fn deny_policy_overrides_allow_role_regardless_of_registration_order() {
    let engine = engine();
    engine.create_role(Role::new("editor", "Editor").with_permissions(vec![Permission::new("docs/*", vec!["write".to_string()], Effect::Allow)]));
    engine.assign_role("a1", "u1", "editor", "admin", None, None).unwrap();

    let mut deny_policy = AccessPolicy::new("deny-freeze", 0, Effect::Deny);
    deny_policy.subjects = vec![SubjectSelector::Any];
    deny_policy.resources = vec![ResourceSelector::new("docs/*")];
    deny_policy.actions = vec!["write".to_string()];
    engine.create_policy(deny_policy);

    let request = AuthorizationRequest::new("u1", "docs/plan", "write");
    let decision = engine.authorize(&request, &AuthorizationContext::default());
    assert!(!decision.allowed);
    assert_eq!(decision.effect, Effect::Deny);
}

#[test]
fn role_hierarchy_resolves_through_a_cycle_without_looping() {
    let engine = engine();
    engine.create_role(Role::new("a", "A").with_inherits_from(["b".to_string()].into_iter().collect()));
    engine.create_role(Role::new("b", "B").with_inherits_from(["a".to_string()].into_iter().collect()));

    let hierarchy = engine.get_role_hierarchy("a");
    assert_eq!(hierarchy.len(), 2);
    assert!(hierarchy.contains(&"a".to_string()));
    assert!(hierarchy.contains(&"b".to_string()));
}

#[test]
fn inherited_role_permission_grants_access_through_the_hierarchy() {
    let engine = engine();
    engine.create_role(Role::new("base-reader", "Base Reader").with_permissions(vec![Permission::new("reports/*", vec!["read".to_string()], Effect::Allow)]));
    engine.create_role(Role::new("auditor", "Auditor").with_inherits_from(["base-reader".to_string()].into_iter().collect()));
    engine.assign_role("a1", "u1", "auditor", "admin", None, None).unwrap();

    let request = AuthorizationRequest::new("u1", "reports/q3", "read");
    let decision = engine.authorize(&request, &AuthorizationContext::default());
    assert!(decision.allowed);
}

#[test]
fn policy_mutation_invalidates_the_decision_cache() {
    let engine = engine();
    let request = AuthorizationRequest::new("svc", "queue/jobs", "enqueue");

    let first = engine.authorize(&request, &AuthorizationContext::default());
    assert!(!first.allowed);
    assert!(!first.cached);

    let cached = engine.authorize(&request, &AuthorizationContext::default());
    assert!(cached.cached);

    let mut allow_policy = AccessPolicy::new("allow-enqueue", 0, Effect::Allow);
    allow_policy.subjects = vec![SubjectSelector::Any];
    allow_policy.resources = vec![ResourceSelector::new("queue/*")];
    allow_policy.actions = vec!["enqueue".to_string()];
    engine.create_policy(allow_policy);

    let after_change = engine.authorize(&request, &AuthorizationContext::default());
    assert!(after_change.allowed);
    assert!(!after_change.cached);
}

#[test]
fn mutual_exclusion_constraint_rejects_the_conflicting_assignment() {
    use iam_core::core::authorization::RoleConstraint;

    let engine = engine();
    engine.create_role(Role::new("approver", "Approver"));
    engine.create_role(Role::new("payer", "Payer").with_permissions(vec![]));
    let mut payer = engine.get_role("payer").unwrap();
    payer.constraints = vec![RoleConstraint::MutualExclusion(["approver".to_string()].into_iter().collect())];
    engine.create_role(payer);

    engine.assign_role("a1", "u1", "approver", "admin", None, None).unwrap();
    let result = engine.assign_role("a2", "u1", "payer", "admin", None, None);
    assert!(result.is_err());
}

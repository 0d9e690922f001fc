//! Governance Engine properties (spec §8, scenario S4): a SoD policy blocks
//! the conflicting half of a role pair but never the first half, exemptions
//! suppress an otherwise-detected violation, and a non-certify decision in
//! a certification campaign revokes the underlying role assignment.

use chrono::Utc;
use iam_core::adapters::crypto::nonce::new_id;
use iam_core::core::authorization::Role;
use iam_core::core::clock::FixedClock;
use iam_core::core::governance::{SodExemption, SodPolicy};
use iam_core::services::{AuthorizationEngine, GovernanceEngine};
use std::sync::Arc;

fn stack() -> (Arc<AuthorizationEngine>, GovernanceEngine) {
    let clock = Arc::new(FixedClock::new(Utc::now()));
    let authorization = Arc::new(AuthorizationEngine::new(clock.clone()));
    let governance = GovernanceEngine::new(authorization.clone(), clock);
    (authorization, governance)
}

#[test]
fn holding_only_one_half_of_a_conflicting_pair_raises_no_violation() {
    let (authorization, governance) = stack();
    authorization.create_role(Role::new("approver", "Approver"));
    authorization.create_role(Role::new("payer", "Payer"));
    governance.register_sod_policy(SodPolicy::new("p1", "finance-sod", vec![("approver".to_string(), "payer".to_string())]));

    let violations = governance.evaluate_all_sod("u1");
    assert!(violations.is_empty());
}

#[test]
fn requesting_the_conflicting_second_role_surfaces_exactly_one_violation() {
    let (authorization, governance) = stack();
    authorization.create_role(Role::new("approver", "Approver"));
    authorization.create_role(Role::new("payer", "Payer"));
    authorization.assign_role(new_id(), "u1", "approver", "admin", None, None).unwrap();
    governance.register_sod_policy(SodPolicy::new("p1", "finance-sod", vec![("approver".to_string(), "payer".to_string())]));

    let (_request, violations) = governance.submit_access_request("u1", "payer", "quarter close");
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].policy_id, "p1");
}

#[test]
fn an_exemption_suppresses_the_violation_that_would_otherwise_fire() {
    let (authorization, governance) = stack();
    authorization.create_role(Role::new("approver", "Approver"));
    authorization.create_role(Role::new("payer", "Payer"));
    authorization.assign_role(new_id(), "u1", "approver", "admin", None, None).unwrap();
    authorization.assign_role(new_id(), "u1", "payer", "admin", None, None).unwrap();
    governance.register_sod_policy(SodPolicy::new("p1", "finance-sod", vec![("approver".to_string(), "payer".to_string())]));

    let before = governance.evaluate_all_sod("u1");
    assert_eq!(before.len(), 1);

    governance.grant_sod_exemption(SodExemption {
        identity_id: "u1".to_string(),
        policy_id: "p1".to_string(),
        reason: "temporary coverage".to_string(),
        granted_by: "admin".to_string(),
        expires_at: Some(Utc::now() + chrono::Duration::days(7)),
    });

    let after = governance.evaluate_all_sod("u1");
    assert!(after.is_empty());
}

#[test]
fn certification_campaign_keeps_a_certified_assignment_and_revokes_a_rejected_one() {
    let (authorization, governance) = stack();
    authorization.create_role(Role::new("role-viewer", "Viewer"));
    authorization.create_role(Role::new("role-editor", "Editor"));
    let viewer_assignment = authorization.assign_role(new_id(), "u1", "role-viewer", "admin", None, None).unwrap();
    let editor_assignment = authorization.assign_role(new_id(), "u2", "role-editor", "admin", None, None).unwrap();

    let campaign = governance.create_campaign("Q3 review", vec!["role-viewer".to_string(), "role-editor".to_string()]);
    governance.start_campaign(&campaign.id).unwrap();
    governance.record_certification_decision(&campaign.id, viewer_assignment.id.clone(), "reviewer1", true).unwrap();
    governance.record_certification_decision(&campaign.id, editor_assignment.id.clone(), "reviewer1", false).unwrap();

    assert!(authorization.effective_roles("u1").contains("role-viewer"));
    assert!(!authorization.effective_roles("u2").contains("role-editor"));
}

#[test]
fn fulfilling_an_access_request_grants_exactly_the_requested_role() {
    let (authorization, governance) = stack();
    authorization.create_role(Role::new("role-viewer", "Viewer"));

    let (request, violations) = governance.submit_access_request("u1", "role-viewer", "need dashboard access");
    assert!(violations.is_empty());
    governance.decide_access_request(&request.id, "approver1", true, None).unwrap();
    governance.fulfill_access_request(&request.id, "approver1").unwrap();

    assert!(authorization.effective_roles("u1").contains("role-viewer"));
    assert!(!authorization.effective_roles("u1").contains("some-other-role"));
}

//! Governance Engine: access requests, certification campaigns, and
//! separation-of-duties evaluation (spec §2 subsystem 6, §4.5).

use crate::adapters::crypto::nonce::new_id;
use crate::core::clock::Clock;
use crate::core::error::{IamError, IamResult};
use crate::core::governance::{
    evaluate_all_sod, evaluate_sod, AccessRequest, CertificationCampaign, SodExemption, SodPolicy,
    SodViolation,
};
use crate::event::{IamEvent, ListenerRegistry};
use crate::services::authorization_engine::AuthorizationEngine;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct GovernanceEngine {
    access_requests: Arc<DashMap<String, AccessRequest>>,
    campaigns: Arc<DashMap<String, CertificationCampaign>>,
    sod_policies: Arc<DashMap<String, SodPolicy>>,
    sod_exemptions: Arc<DashMap<String, Vec<SodExemption>>>,
    sod_violations: Arc<DashMap<String, SodViolation>>,
    authorization: Arc<AuthorizationEngine>,
    clock: Arc<dyn Clock>,
    pub listeners: ListenerRegistry,
}

impl GovernanceEngine {
    pub fn new(authorization: Arc<AuthorizationEngine>, clock: Arc<dyn Clock>) -> Self {
        Self {
            access_requests: Arc::new(DashMap::new()),
            campaigns: Arc::new(DashMap::new()),
            sod_policies: Arc::new(DashMap::new()),
            sod_exemptions: Arc::new(DashMap::new()),
            sod_violations: Arc::new(DashMap::new()),
            authorization,
            clock,
            listeners: ListenerRegistry::new(),
        }
    }

    fn emit(&self, name: &str, subject_id: &str) {
        let mut payload = BTreeMap::new();
        payload.insert("id".to_string(), subject_id.to_string().into());
        self.listeners.dispatch(&IamEvent::new(name, payload, self.clock.now()));
    }

    pub fn register_sod_policy(&self, policy: SodPolicy) -> SodPolicy {
        self.sod_policies.insert(policy.id.clone(), policy.clone());
        policy
    }

    pub fn grant_sod_exemption(&self, exemption: SodExemption) {
        self.sod_exemptions.entry(exemption.identity_id.clone()).or_default().push(exemption);
    }

    /// `evaluateSoD(identity, proposedRole)`: checks a role a caller is
    /// considering granting against every held role, before it is assigned
    /// (spec §4.5's second entry point, alongside `evaluateAllSoD`).
    pub fn evaluate_sod(&self, identity_id: &str, proposed_role: &str) -> Vec<SodViolation> {
        let held_roles = self.authorization.effective_roles(identity_id);
        let policies: Vec<SodPolicy> = self.sod_policies.iter().map(|e| e.value().clone()).collect();
        let exemptions = self.sod_exemptions.get(identity_id).map(|e| e.value().clone()).unwrap_or_default();
        let now = self.clock.now();
        evaluate_sod(identity_id, proposed_role, &held_roles, &policies, &exemptions, new_id, now)
    }

    /// `evaluateAllSoD(identity, currentRoles)`: checks every role pair
    /// already held. Permission-level conflicts across held roles are not
    /// emitted here (open-question decision, see DESIGN.md).
    pub fn evaluate_all_sod(&self, identity_id: &str) -> Vec<SodViolation> {
        let held_roles = self.authorization.effective_roles(identity_id);
        let policies: Vec<SodPolicy> = self.sod_policies.iter().map(|e| e.value().clone()).collect();
        let exemptions = self.sod_exemptions.get(identity_id).map(|e| e.value().clone()).unwrap_or_default();
        let now = self.clock.now();
        let violations = evaluate_all_sod(identity_id, &held_roles, &policies, &exemptions, new_id, now);
        for violation in &violations {
            self.sod_violations.insert(violation.id.clone(), violation.clone());
        }
        if !violations.is_empty() {
            self.emit("sodViolationDetected", identity_id);
        }
        violations
    }

    pub fn get_sod_violations_for(&self, identity_id: &str) -> Vec<SodViolation> {
        self.sod_violations.iter().filter(|e| e.value().identity_id == identity_id).map(|e| e.value().clone()).collect()
    }

    /// Create an access request; runs a SoD pre-check but does not block
    /// request creation on a conflict (the conflict surfaces at approval).
    pub fn submit_access_request(&self, requester_id: impl Into<String>, role_id: impl Into<String>, justification: impl Into<String>) -> (AccessRequest, Vec<SodViolation>) {
        let requester_id = requester_id.into();
        let role_id = role_id.into();
        let now = self.clock.now();
        let violations = self.evaluate_sod(&requester_id, &role_id);
        let request = AccessRequest::new(new_id(), requester_id, role_id, justification, now);
        self.access_requests.insert(request.id.clone(), request.clone());
        self.emit("accessRequested", &request.id);
        (request, violations)
    }

    pub fn get_access_request(&self, id: &str) -> IamResult<AccessRequest> {
        self.access_requests.get(id).map(|e| e.value().clone()).ok_or_else(|| IamError::not_found("AccessRequest", id))
    }

    pub fn decide_access_request(&self, id: &str, approver_id: impl Into<String>, approved: bool, comment: Option<String>) -> IamResult<AccessRequest> {
        let mut entry = self.access_requests.get_mut(id).ok_or_else(|| IamError::not_found("AccessRequest", id))?;
        let now = self.clock.now();
        entry.record_decision(approver_id, approved, comment, now)?;
        let updated = entry.value().clone();
        drop(entry);
        self.emit(if approved { "accessRequestApproved" } else { "accessRequestRejected" }, id);
        Ok(updated)
    }

    pub fn cancel_access_request(&self, id: &str) -> IamResult<AccessRequest> {
        let mut entry = self.access_requests.get_mut(id).ok_or_else(|| IamError::not_found("AccessRequest", id))?;
        let now = self.clock.now();
        entry.cancel(now)?;
        Ok(entry.value().clone())
    }

    pub fn fulfill_access_request(&self, id: &str, granted_by: impl Into<String>) -> IamResult<AccessRequest> {
        let (identity_id, role_id) = {
            let entry = self.access_requests.get(id).ok_or_else(|| IamError::not_found("AccessRequest", id))?;
            (entry.requester_id.clone(), entry.role_id.clone())
        };
        self.authorization.assign_role(new_id(), &identity_id, &role_id, granted_by, None, None)?;
        let mut entry = self.access_requests.get_mut(id).ok_or_else(|| IamError::not_found("AccessRequest", id))?;
        entry.fulfill()?;
        let updated = entry.value().clone();
        drop(entry);
        self.emit("accessRequestFulfilled", id);
        Ok(updated)
    }

    pub fn create_campaign(&self, name: impl Into<String>, scope_role_ids: Vec<String>) -> CertificationCampaign {
        let now = self.clock.now();
        let total_in_scope: u64 = scope_role_ids
            .iter()
            .map(|role_id| self.authorization.assignments_for_role(role_id).len() as u64)
            .sum();
        let campaign = CertificationCampaign::new(new_id(), name, scope_role_ids, total_in_scope, now);
        self.campaigns.insert(campaign.id.clone(), campaign.clone());
        campaign
    }

    pub fn get_campaign(&self, id: &str) -> IamResult<CertificationCampaign> {
        self.campaigns.get(id).map(|e| e.value().clone()).ok_or_else(|| IamError::not_found("CertificationCampaign", id))
    }

    pub fn start_campaign(&self, id: &str) -> IamResult<CertificationCampaign> {
        let mut entry = self.campaigns.get_mut(id).ok_or_else(|| IamError::not_found("CertificationCampaign", id))?;
        let now = self.clock.now();
        entry.start(now)?;
        let updated = entry.value().clone();
        drop(entry);
        self.emit("campaignStarted", id);
        Ok(updated)
    }

    pub fn record_certification_decision(&self, id: &str, assignment_id: impl Into<String>, reviewer_id: impl Into<String>, certified: bool) -> IamResult<CertificationCampaign> {
        let assignment_id = assignment_id.into();
        let certified_clone = certified;
        let mut entry = self.campaigns.get_mut(id).ok_or_else(|| IamError::not_found("CertificationCampaign", id))?;
        let now = self.clock.now();
        entry.record_decision(assignment_id.clone(), reviewer_id, certified, now)?;
        let updated = entry.value().clone();
        drop(entry);
        if certified_clone {
            self.emit("certify", &assignment_id);
        } else {
            let _ = self.authorization.revoke_assignment(&assignment_id);
            self.emit("revoke", &assignment_id);
        }
        Ok(updated)
    }

    pub fn complete_campaign(&self, id: &str) -> IamResult<CertificationCampaign> {
        let mut entry = self.campaigns.get_mut(id).ok_or_else(|| IamError::not_found("CertificationCampaign", id))?;
        let now = self.clock.now();
        entry.complete(now)?;
        let updated = entry.value().clone();
        drop(entry);
        self.emit("campaignCompleted", id);
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::authorization::Role;
    use crate::core::clock::FixedClock;
    use chrono::Utc;

    fn engine() -> (Arc<AuthorizationEngine>, GovernanceEngine) {
        let clock = Arc::new(FixedClock::new(Utc::now()));
        let authorization = Arc::new(AuthorizationEngine::new(clock.clone()));
        let governance = GovernanceEngine::new(authorization.clone(), clock);
        (authorization, governance)
    }

    #[test]
    fn submitted_request_can_be_approved_and_fulfilled() {
        let (authorization, governance) = engine();
        authorization.create_role(Role::new("role-viewer", "Viewer"));

        let (request, violations) = governance.submit_access_request("u1", "role-viewer", "need read access");
        assert!(violations.is_empty());

        governance.decide_access_request(&request.id, "approver1", true, None).unwrap();
        let fulfilled = governance.fulfill_access_request(&request.id, "approver1").unwrap();
        assert_eq!(fulfilled.status.to_string(), "fulfilled");
        assert!(authorization.effective_roles("u1").contains("role-viewer"));
    }

    #[test]
    fn conflicting_held_role_surfaces_as_sod_violation() {
        let (authorization, governance) = engine();
        authorization.create_role(Role::new("approver", "Approver"));
        authorization.create_role(Role::new("payer", "Payer"));
        authorization.assign_role(new_id(), "u1", "approver", "admin", None, None).unwrap();

        governance.register_sod_policy(SodPolicy::new("p1", "finance-sod", vec![("approver".to_string(), "payer".to_string())]));

        let (_, violations) = governance.submit_access_request("u1", "payer", "need payer role");
        assert_eq!(violations.len(), 1);
    }

    #[test]
    fn certification_campaign_revokes_on_non_certify_decision() {
        let (authorization, governance) = engine();
        authorization.create_role(Role::new("role-viewer", "Viewer"));
        let assignment = authorization.assign_role(new_id(), "u1", "role-viewer", "admin", None, None).unwrap();

        let campaign = governance.create_campaign("Q3 review", vec!["role-viewer".to_string()]);
        governance.start_campaign(&campaign.id).unwrap();
        governance.record_certification_decision(&campaign.id, assignment.id.clone(), "reviewer1", false).unwrap();

        assert!(!authorization.effective_roles("u1").contains("role-viewer"));
    }
}

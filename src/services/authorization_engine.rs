//! Authorization Engine: RBAC role resolution, ABAC condition evaluation,
//! PBAC policy matching, deny-overrides combination, and decision caching
//! (spec §2 subsystem 1, §4.1).

use crate::core::authorization::{
    action_matches, resource_matches, AccessPolicy, AuthorizationDecision, AuthorizationRequest,
    ConditionOperator, ConditionSource, Effect, PermissionCondition, Role, RoleAssignment,
    RoleAssignmentStatus, RoleConstraint, SubjectSelector,
};
use crate::core::clock::Clock;
use crate::core::error::{ConstraintViolationError, IamError, IamResult};
use crate::core::value::AttributeValue;
use crate::event::{IamEvent, ListenerRegistry};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

const DECISION_CACHE_TTL: Duration = Duration::seconds(60);

/// Attribute bags a caller resolves before invoking `authorize`, so ABAC/PBAC
/// conditions have something to evaluate against (spec §4.1 step 4).
#[derive(Debug, Clone, Default)]
pub struct AuthorizationContext {
    pub subject: AttributeValue,
    pub resource: AttributeValue,
    pub environment: AttributeValue,
    pub context: AttributeValue,
}

impl AuthorizationContext {
    fn bag(&self, source: ConditionSource) -> &AttributeValue {
        match source {
            ConditionSource::Subject => &self.subject,
            ConditionSource::Resource => &self.resource,
            ConditionSource::Environment => &self.environment,
            ConditionSource::Context => &self.context,
        }
    }
}

pub fn evaluate_condition(condition: &PermissionCondition, ctx: &AuthorizationContext) -> bool {
    let resolved = ctx.bag(condition.source).resolve_path(&condition.field);

    match condition.operator {
        ConditionOperator::Exists => resolved.map(|v| !matches!(v, AttributeValue::Null)).unwrap_or(false),
        ConditionOperator::Equals => resolved.map(|v| v.to_loose_string() == condition.value.to_loose_string()).unwrap_or(false),
        ConditionOperator::NotEquals => resolved.map(|v| v.to_loose_string() != condition.value.to_loose_string()).unwrap_or(true),
        ConditionOperator::Contains => match resolved {
            Some(AttributeValue::List(items)) => items.iter().any(|i| i.to_loose_string() == condition.value.to_loose_string()),
            Some(AttributeValue::String(s)) => s.contains(&condition.value.to_loose_string()),
            _ => false,
        },
        ConditionOperator::In => match &condition.value {
            AttributeValue::List(items) => resolved.map(|v| items.iter().any(|i| i.to_loose_string() == v.to_loose_string())).unwrap_or(false),
            _ => false,
        },
        ConditionOperator::GreaterThan => match (resolved.and_then(AttributeValue::as_number), condition.value.as_number()) {
            (Some(a), Some(b)) => a > b,
            _ => false,
        },
        ConditionOperator::LessThan => match (resolved.and_then(AttributeValue::as_number), condition.value.as_number()) {
            (Some(a), Some(b)) => a < b,
            _ => false,
        },
        ConditionOperator::Between => match (&condition.value, resolved.and_then(AttributeValue::as_number)) {
            (AttributeValue::List(bounds), Some(actual)) if bounds.len() == 2 => {
                let (Some(low), Some(high)) = (bounds[0].as_number(), bounds[1].as_number()) else {
                    return false;
                };
                actual >= low && actual <= high
            }
            _ => false,
        },
        ConditionOperator::Matches => {
            let Some(resolved) = resolved else { return false };
            let pattern = condition.value.to_loose_string();
            regex::Regex::new(&pattern).map(|re| re.is_match(&resolved.to_loose_string())).unwrap_or(false)
        }
    }
}

pub fn evaluate_conditions(conditions: &[PermissionCondition], ctx: &AuthorizationContext) -> bool {
    conditions.iter().all(|c| evaluate_condition(c, ctx))
}

struct MatchedEffect {
    effect: Effect,
    role_id: Option<String>,
    permission_label: Option<String>,
    policy_id: Option<String>,
    obligations: BTreeMap<String, String>,
}

pub struct AuthorizationEngine {
    roles: Arc<DashMap<String, Role>>,
    assignments: Arc<DashMap<String, RoleAssignment>>,
    by_identity: Arc<DashMap<String, Vec<String>>>,
    policies: Arc<DashMap<String, AccessPolicy>>,
    decision_cache: Arc<DashMap<String, (AuthorizationDecision, DateTime<Utc>)>>,
    clock: Arc<dyn Clock>,
    pub listeners: ListenerRegistry,
}

impl AuthorizationEngine {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            roles: Arc::new(DashMap::new()),
            assignments: Arc::new(DashMap::new()),
            by_identity: Arc::new(DashMap::new()),
            policies: Arc::new(DashMap::new()),
            decision_cache: Arc::new(DashMap::new()),
            clock,
            listeners: ListenerRegistry::new(),
        }
    }

    fn emit(&self, name: &str, subject_id: &str) {
        let mut payload = BTreeMap::new();
        payload.insert("id".to_string(), subject_id.to_string().into());
        self.listeners.dispatch(&IamEvent::new(name, payload, self.clock.now()));
    }

    fn invalidate_cache(&self) {
        self.decision_cache.clear();
    }

    pub fn create_role(&self, role: Role) -> Role {
        self.roles.insert(role.id.clone(), role.clone());
        self.invalidate_cache();
        role
    }

    pub fn get_role(&self, role_id: &str) -> IamResult<Role> {
        self.roles.get(role_id).map(|e| e.value().clone()).ok_or_else(|| IamError::not_found("Role", role_id))
    }

    pub fn update_role(&self, role: Role) -> IamResult<Role> {
        if !self.roles.contains_key(&role.id) {
            return Err(IamError::not_found("Role", &role.id));
        }
        self.roles.insert(role.id.clone(), role.clone());
        self.invalidate_cache();
        Ok(role)
    }

    pub fn delete_role(&self, role_id: &str) -> IamResult<()> {
        self.roles.remove(role_id).map(|_| ()).ok_or_else(|| IamError::not_found("Role", role_id))?;
        self.invalidate_cache();
        Ok(())
    }

    pub fn list_roles(&self) -> Vec<Role> {
        self.roles.iter().map(|e| e.value().clone()).collect()
    }

    pub fn create_policy(&self, policy: AccessPolicy) -> AccessPolicy {
        self.policies.insert(policy.id.clone(), policy.clone());
        self.invalidate_cache();
        policy
    }

    pub fn update_policy(&self, policy: AccessPolicy) -> IamResult<AccessPolicy> {
        if !self.policies.contains_key(&policy.id) {
            return Err(IamError::not_found("AccessPolicy", &policy.id));
        }
        self.policies.insert(policy.id.clone(), policy.clone());
        self.invalidate_cache();
        Ok(policy)
    }

    pub fn delete_policy(&self, policy_id: &str) -> IamResult<()> {
        self.policies.remove(policy_id).map(|_| ()).ok_or_else(|| IamError::not_found("AccessPolicy", policy_id))?;
        self.invalidate_cache();
        Ok(())
    }

    /// Cycle-safe transitive closure over `Role::inherits_from`.
    pub fn get_role_hierarchy(&self, role_id: &str) -> Vec<String> {
        let mut visited = BTreeSet::new();
        let mut ordered = Vec::new();
        self.collect_hierarchy(role_id, &mut visited, &mut ordered);
        ordered
    }

    fn collect_hierarchy(&self, role_id: &str, visited: &mut BTreeSet<String>, ordered: &mut Vec<String>) {
        if !visited.insert(role_id.to_string()) {
            return;
        }
        ordered.push(role_id.to_string());
        if let Some(role) = self.roles.get(role_id) {
            for parent in role.inherits_from.clone() {
                self.collect_hierarchy(&parent, visited, ordered);
            }
        }
    }

    /// The ancestor roles a role inherits from, excluding itself — distinct
    /// from `get_role_hierarchy`, which includes the starting role.
    pub fn get_inherited_roles(&self, role_id: &str) -> Vec<String> {
        self.get_role_hierarchy(role_id).into_iter().filter(|id| id != role_id).collect()
    }

    fn active_assignment_ids(&self, identity_id: &str) -> Vec<String> {
        self.by_identity.get(identity_id).map(|e| e.value().clone()).unwrap_or_default()
    }

    /// Lazily demote expired assignments on read and return the identity's
    /// currently-effective ones (spec §3).
    fn effective_assignments(&self, identity_id: &str) -> Vec<RoleAssignment> {
        let now = self.clock.now();
        self.active_assignment_ids(identity_id)
            .into_iter()
            .filter_map(|id| {
                let mut entry = self.assignments.get_mut(&id)?;
                if entry.status == RoleAssignmentStatus::Active && entry.is_expired(now) {
                    entry.status = RoleAssignmentStatus::Expired;
                }
                entry.is_effective(now).then(|| entry.value().clone())
            })
            .collect()
    }

    /// Transitive-closure effective role set for an identity: every
    /// directly-assigned role plus everything it inherits, cycle-safe.
    pub fn effective_roles(&self, identity_id: &str) -> BTreeSet<String> {
        let mut visited = BTreeSet::new();
        for assignment in self.effective_assignments(identity_id) {
            let mut ordered = Vec::new();
            self.collect_hierarchy(&assignment.role_id, &mut BTreeSet::new(), &mut ordered);
            visited.extend(ordered);
        }
        visited
    }

    /// The identity's directly-assigned, currently-effective assignments —
    /// unlike `effective_roles`, this does not expand the inheritance closure.
    pub fn get_roles_by_identity(&self, identity_id: &str) -> Vec<RoleAssignment> {
        self.effective_assignments(identity_id)
    }

    /// Whether `role_id` is effectively assigned to `identity_id`, directly
    /// or through inheritance.
    pub fn is_role_assigned(&self, identity_id: &str, role_id: &str) -> bool {
        self.effective_roles(identity_id).contains(role_id)
    }

    /// Every permission reachable by an identity's effective role set,
    /// deduplicated by `(resource_pattern, action, effect)`.
    pub fn get_effective_permissions(&self, identity_id: &str) -> Vec<crate::core::authorization::Permission> {
        let roles = self.effective_roles(identity_id);
        let mut seen = BTreeSet::new();
        let mut permissions = Vec::new();
        for role_id in &roles {
            let Some(role) = self.roles.get(role_id) else { continue };
            for permission in &role.permissions {
                let key = (permission.resource_pattern.clone(), permission.actions.join(","), permission.effect == Effect::Allow);
                if seen.insert(key) {
                    permissions.push(permission.clone());
                }
            }
        }
        permissions
    }

    /// Validate a role's structural constraints before granting it to an
    /// identity (spec §4.1 "Role constraint validation").
    fn validate_constraints(&self, identity_id: &str, role: &Role, now: DateTime<Utc>) -> IamResult<()> {
        let held = self.effective_roles(identity_id);
        let held_count = self.effective_assignments(identity_id).len();

        for constraint in &role.constraints {
            match constraint {
                RoleConstraint::MutualExclusion(others) => {
                    if let Some(conflict) = others.iter().find(|r| held.contains(*r)) {
                        return Err(IamError::ConstraintViolation(ConstraintViolationError::mutual_exclusion(format!(
                            "role {} conflicts with already-held role {}",
                            role.id, conflict
                        ))));
                    }
                }
                RoleConstraint::Prerequisite(required) => {
                    if !held.contains(required) {
                        return Err(IamError::ConstraintViolation(ConstraintViolationError::prerequisite(format!(
                            "role {} requires {} to already be held",
                            role.id, required
                        ))));
                    }
                }
                RoleConstraint::Temporal { start, end } => {
                    if now < *start || now > *end {
                        return Err(IamError::ConstraintViolation(ConstraintViolationError::temporal(format!(
                            "role {} is only assignable between {} and {}",
                            role.id, start, end
                        ))));
                    }
                }
                RoleConstraint::Cardinality { max_roles_per_identity } => {
                    if held_count >= *max_roles_per_identity {
                        return Err(IamError::ConstraintViolation(ConstraintViolationError::cardinality(format!(
                            "identity {} already holds {} roles (max {})",
                            identity_id, held_count, max_roles_per_identity
                        ))));
                    }
                }
            }
        }

        if let Some(max) = role.max_assignees {
            let current_assignees = self
                .assignments
                .iter()
                .filter(|e| e.role_id == role.id && e.is_effective(now))
                .count();
            if current_assignees >= max {
                return Err(IamError::ConstraintViolation(ConstraintViolationError::cardinality(format!(
                    "role {} already at maxAssignees ({})",
                    role.id, max
                ))));
            }
        }

        Ok(())
    }

    pub fn assign_role(
        &self,
        assignment_id: impl Into<String>,
        identity_id: impl Into<String>,
        role_id: impl Into<String>,
        granted_by: impl Into<String>,
        scope: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> IamResult<RoleAssignment> {
        let identity_id = identity_id.into();
        let role_id = role_id.into();
        let now = self.clock.now();
        let role = self.get_role(&role_id)?;
        self.validate_constraints(&identity_id, &role, now)?;

        let assignment = RoleAssignment {
            id: assignment_id.into(),
            identity_id: identity_id.clone(),
            role_id,
            scope,
            expires_at,
            status: RoleAssignmentStatus::Active,
            granted_by: granted_by.into(),
            granted_at: now,
        };
        self.assignments.insert(assignment.id.clone(), assignment.clone());
        self.by_identity.entry(identity_id).or_default().push(assignment.id.clone());
        self.invalidate_cache();
        self.emit("roleAssigned", &assignment.id);
        Ok(assignment)
    }

    /// All currently-effective assignments of a role, used by the
    /// Governance Engine to size a certification campaign's scope.
    pub fn assignments_for_role(&self, role_id: &str) -> Vec<RoleAssignment> {
        let now = self.clock.now();
        self.assignments.iter().filter(|e| e.role_id == role_id && e.is_effective(now)).map(|e| e.value().clone()).collect()
    }

    pub fn revoke_assignment(&self, assignment_id: &str) -> IamResult<()> {
        let mut assignment = self.assignments.get_mut(assignment_id).ok_or_else(|| IamError::not_found("RoleAssignment", assignment_id))?;
        assignment.status = RoleAssignmentStatus::Revoked;
        drop(assignment);
        self.invalidate_cache();
        self.emit("roleRevoked", assignment_id);
        Ok(())
    }

    /// Revoke an identity's direct assignment of a role, resolving
    /// `(identity_id, role_id)` to the underlying assignment — distinct from
    /// `revoke_assignment`, which is keyed by assignment id.
    pub fn revoke_role(&self, identity_id: &str, role_id: &str) -> IamResult<()> {
        let assignment_id = self
            .active_assignment_ids(identity_id)
            .into_iter()
            .find(|id| self.assignments.get(id).map(|a| a.role_id == role_id).unwrap_or(false))
            .ok_or_else(|| IamError::not_found("RoleAssignment", role_id))?;
        self.revoke_assignment(&assignment_id)
    }

    fn matching_permissions(&self, identity_id: &str, effective_roles: &BTreeSet<String>, request: &AuthorizationRequest, ctx: &AuthorizationContext) -> Vec<MatchedEffect> {
        let _ = identity_id;
        let mut matched = Vec::new();
        for role_id in effective_roles {
            let Some(role) = self.roles.get(role_id) else { continue };
            for permission in &role.permissions {
                if resource_matches(&permission.resource_pattern, &request.resource)
                    && action_matches(&permission.actions, &request.action)
                    && evaluate_conditions(&permission.conditions, ctx)
                {
                    matched.push(MatchedEffect {
                        effect: permission.effect,
                        role_id: Some(role_id.clone()),
                        permission_label: Some(format!("{}:{}", permission.resource_pattern, permission.actions.join(","))),
                        policy_id: None,
                        obligations: BTreeMap::new(),
                    });
                }
            }
        }
        matched
    }

    fn subject_selector_matches(&self, selector: &SubjectSelector, request: &AuthorizationRequest, effective_roles: &BTreeSet<String>) -> bool {
        match selector {
            SubjectSelector::Any => true,
            SubjectSelector::User(id) => id == &request.subject_id,
            SubjectSelector::Role(role_id) => effective_roles.contains(role_id),
            SubjectSelector::Service(id) => request.subject_type.as_deref() == Some("service") && id == &request.subject_id,
            SubjectSelector::Group(id) => request.subject_type.as_deref() == Some("group") && id == &request.subject_id,
        }
    }

    fn matching_policies(&self, request: &AuthorizationRequest, effective_roles: &BTreeSet<String>, ctx: &AuthorizationContext) -> Vec<MatchedEffect> {
        let mut policies: Vec<_> = self.policies.iter().filter(|e| e.enabled).map(|e| e.value().clone()).collect();
        policies.sort_by(|a, b| b.priority.cmp(&a.priority));

        let mut matched = Vec::new();
        for policy in policies {
            let subject_ok = policy.subjects.is_empty() || policy.subjects.iter().any(|s| self.subject_selector_matches(s, request, effective_roles));
            let resource_ok = policy.resources.is_empty()
                || policy.resources.iter().any(|r| {
                    resource_matches(&r.pattern, &request.resource)
                        && r.resource_type.as_deref().map(|t| request.resource_type.as_deref() == Some(t)).unwrap_or(true)
                });
            let action_ok = policy.actions.is_empty() || action_matches(&policy.actions, &request.action);
            let conditions_ok = evaluate_conditions(&policy.conditions, ctx);

            if subject_ok && resource_ok && action_ok && conditions_ok {
                matched.push(MatchedEffect {
                    effect: policy.effect,
                    role_id: None,
                    permission_label: None,
                    policy_id: Some(policy.id.clone()),
                    obligations: policy.obligations.clone(),
                });
            }
        }
        matched
    }

    /// The 7-step deterministic authorization algorithm (spec §4.1):
    /// cache lookup, role resolution, permission matching, policy matching,
    /// deny-overrides combination, cache population.
    pub fn authorize(&self, request: &AuthorizationRequest, ctx: &AuthorizationContext) -> AuthorizationDecision {
        let now = self.clock.now();
        let cache_key = request.cache_key();

        if let Some(entry) = self.decision_cache.get(&cache_key) {
            let (decision, cached_at) = entry.value().clone();
            if now < cached_at + DECISION_CACHE_TTL {
                self.emit(if decision.allowed { "accessGranted" } else { "accessDenied" }, &request.subject_id);
                return decision.with_cached(true);
            }
        }

        let effective_roles = self.effective_roles(&request.subject_id);
        let mut matched = self.matching_permissions(&request.subject_id, &effective_roles, request, ctx);
        matched.extend(self.matching_policies(request, &effective_roles, ctx));

        let any_deny = matched.iter().any(|m| m.effect == Effect::Deny);
        let any_allow = matched.iter().any(|m| m.effect == Effect::Allow);
        let allowed = any_allow && !any_deny;
        let effect = if allowed { Effect::Allow } else { Effect::Deny };

        let matched_roles: Vec<String> = matched.iter().filter_map(|m| m.role_id.clone()).collect();
        let matched_permissions: Vec<String> = matched.iter().filter_map(|m| m.permission_label.clone()).collect();
        let matched_policies: Vec<String> = matched.iter().filter_map(|m| m.policy_id.clone()).collect();
        let obligations = matched
            .iter()
            .filter(|m| m.effect == effect)
            .flat_map(|m| m.obligations.clone())
            .collect();

        let decision = AuthorizationDecision {
            allowed,
            effect,
            matched_policies,
            matched_roles,
            matched_permissions,
            obligations,
            advice: None,
            evaluated_at: now,
            evaluation_time_ms: 0,
            cached: false,
        };

        self.decision_cache.insert(cache_key, (decision.clone(), now));
        self.emit(if allowed { "accessGranted" } else { "accessDenied" }, &request.subject_id);
        decision
    }

    pub fn batch_authorize(&self, requests: &[(AuthorizationRequest, AuthorizationContext)]) -> Vec<AuthorizationDecision> {
        requests.iter().map(|(request, ctx)| self.authorize(request, ctx)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::authorization::{Permission, RoleConstraint};
    use crate::core::clock::FixedClock;

    fn engine() -> AuthorizationEngine {
        AuthorizationEngine::new(Arc::new(FixedClock::new(Utc::now())))
    }

    #[test]
    fn default_deny_with_no_matching_role() {
        let engine = engine();
        let request = AuthorizationRequest::new("u1", "documents/1", "read");
        let decision = engine.authorize(&request, &AuthorizationContext::default());
        assert!(!decision.allowed);
    }

    #[test]
    fn role_permission_grants_access() {
        let engine = engine();
        engine.create_role(Role::new("viewer", "Viewer").with_permissions(vec![Permission::new("documents/*", vec!["read".to_string()], Effect::Allow)]));
        engine.assign_role("a1", "u1", "viewer", "admin", None, None).unwrap();

        let request = AuthorizationRequest::new("u1", "documents/1", "read");
        let decision = engine.authorize(&request, &AuthorizationContext::default());
        assert!(decision.allowed);
        assert_eq!(decision.matched_roles, vec!["viewer".to_string()]);
    }

    #[test]
    fn deny_overrides_allow() {
        let engine = engine();
        engine.create_role(
            Role::new("viewer", "Viewer").with_permissions(vec![
                Permission::new("documents/*", vec!["read".to_string()], Effect::Allow),
                Permission::new("documents/secret", vec!["read".to_string()], Effect::Deny),
            ]),
        );
        engine.assign_role("a1", "u1", "viewer", "admin", None, None).unwrap();

        let request = AuthorizationRequest::new("u1", "documents/secret", "read");
        let decision = engine.authorize(&request, &AuthorizationContext::default());
        assert!(!decision.allowed);
    }

    #[test]
    fn mutual_exclusion_constraint_rejects_conflicting_role() {
        let engine = engine();
        engine.create_role(Role::new("billing", "Billing"));
        engine.create_role(Role::new("auditor", "Auditor").with_permissions(vec![]));
        {
            let mut role = engine.roles.get_mut("auditor").unwrap();
            role.constraints.push(RoleConstraint::MutualExclusion(BTreeSet::from(["billing".to_string()])));
        }
        engine.assign_role("a1", "u1", "billing", "admin", None, None).unwrap();
        let result = engine.assign_role("a2", "u1", "auditor", "admin", None, None);
        assert!(result.is_err());
    }

    #[test]
    fn role_hierarchy_is_cycle_safe() {
        let engine = engine();
        engine.create_role(Role::new("a", "A").with_inherits_from(BTreeSet::from(["b".to_string()])));
        engine.create_role(Role::new("b", "B").with_inherits_from(BTreeSet::from(["a".to_string()])));

        let hierarchy = engine.get_role_hierarchy("a");
        assert_eq!(hierarchy.len(), 2);
    }

    #[test]
    fn pbac_policy_matches_by_priority_and_condition() {
        let engine = engine();
        let mut policy = AccessPolicy::new("p1", 10, Effect::Allow);
        policy.subjects = vec![SubjectSelector::User("u1".to_string())];
        policy.resources = vec![crate::core::authorization::ResourceSelector::new("reports/*")];
        policy.actions = vec!["export".to_string()];
        engine.create_policy(policy);

        let request = AuthorizationRequest::new("u1", "reports/q3", "export");
        let decision = engine.authorize(&request, &AuthorizationContext::default());
        assert!(decision.allowed);
        assert_eq!(decision.matched_policies, vec!["p1".to_string()]);
    }
}

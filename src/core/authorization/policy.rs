use crate::core::authorization::{Effect, PermissionCondition};
use std::collections::BTreeMap;

/// A PBAC subject selector. `Role` matches by direct-or-inherited role
/// membership, resolved by the Authorization Engine against the effective
/// role set it already computed for RBAC.
#[derive(Debug, Clone)]
pub enum SubjectSelector {
    User(String),
    Role(String),
    Service(String),
    Group(String),
    Any,
}

#[derive(Debug, Clone)]
pub struct ResourceSelector {
    pub pattern: String,
    pub resource_type: Option<String>,
}

impl ResourceSelector {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            resource_type: None,
        }
    }

    pub fn with_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = Some(resource_type.into());
        self
    }
}

/// A standalone PBAC policy, evaluated alongside role-derived RBAC/ABAC
/// permissions and combined with deny-overrides (spec §4.1 steps 5-6).
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    pub id: String,
    pub priority: i32,
    pub enabled: bool,
    pub effect: Effect,
    pub subjects: Vec<SubjectSelector>,
    pub resources: Vec<ResourceSelector>,
    pub actions: Vec<String>,
    pub conditions: Vec<PermissionCondition>,
    pub obligations: BTreeMap<String, String>,
}

impl AccessPolicy {
    pub fn new(id: impl Into<String>, priority: i32, effect: Effect) -> Self {
        Self {
            id: id.into(),
            priority,
            enabled: true,
            effect,
            subjects: Vec::new(),
            resources: Vec::new(),
            actions: Vec::new(),
            conditions: Vec::new(),
            obligations: BTreeMap::new(),
        }
    }
}

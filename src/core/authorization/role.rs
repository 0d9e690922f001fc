use crate::core::authorization::Permission;
use std::collections::BTreeSet;

/// A structural constraint checked at role-assignment time (spec §4.1,
/// "Role constraint validation").
#[derive(Debug, Clone)]
pub enum RoleConstraint {
    /// Rejects the assignment if any of these other role ids is already
    /// held by the target identity.
    MutualExclusion(BTreeSet<String>),
    /// Rejects the assignment unless this other role id is already held.
    Prerequisite(String),
    /// Rejects the assignment outside `[start, end]`.
    Temporal {
        start: chrono::DateTime<chrono::Utc>,
        end: chrono::DateTime<chrono::Utc>,
    },
    /// Rejects the assignment if the identity already holds
    /// `max_roles_per_identity` active roles.
    Cardinality { max_roles_per_identity: usize },
}

/// An RBAC role: a set of permissions plus an inheritance edge set forming
/// a DAG (`inherits_from`). Cycle protection is the Authorization Engine's
/// responsibility (visited-set traversal), not this type's.
#[derive(Debug, Clone)]
pub struct Role {
    pub id: String,
    pub name: String,
    pub permissions: Vec<Permission>,
    pub inherits_from: BTreeSet<String>,
    pub constraints: Vec<RoleConstraint>,
    pub max_assignees: Option<usize>,
}

impl Role {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            permissions: Vec::new(),
            inherits_from: BTreeSet::new(),
            constraints: Vec::new(),
            max_assignees: None,
        }
    }

    pub fn with_permissions(mut self, permissions: Vec<Permission>) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn with_inherits_from(mut self, parents: BTreeSet<String>) -> Self {
        self.inherits_from = parents;
        self
    }
}

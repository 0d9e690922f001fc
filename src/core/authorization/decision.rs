use crate::core::authorization::Effect;
use crate::core::value::AttributeValue;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// The inbound authorization request shape from spec §6.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub subject_id: String,
    pub subject_type: Option<String>,
    pub resource: String,
    pub resource_type: Option<String>,
    pub action: String,
    pub environment: Option<AttributeValue>,
    pub context: Option<AttributeValue>,
}

impl AuthorizationRequest {
    pub fn new(subject_id: impl Into<String>, resource: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            subject_type: None,
            resource: resource.into(),
            resource_type: None,
            action: action.into(),
            environment: None,
            context: None,
        }
    }

    /// Deterministic serialization used as the decision cache key, per
    /// spec §4.1 step 1. Environment/context are rendered via their `Debug`
    /// form (stable for a given `BTreeMap`-backed `AttributeValue::Map`).
    pub fn cache_key(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{:?}|{:?}",
            self.subject_id,
            self.subject_type.as_deref().unwrap_or(""),
            self.resource,
            self.resource_type.as_deref().unwrap_or(""),
            self.action,
            self.environment,
            self.context,
        )
    }
}

/// The outcome of `authorize`, per spec §6.
#[derive(Debug, Clone)]
pub struct AuthorizationDecision {
    pub allowed: bool,
    pub effect: Effect,
    pub matched_policies: Vec<String>,
    pub matched_roles: Vec<String>,
    pub matched_permissions: Vec<String>,
    pub obligations: BTreeMap<String, String>,
    pub advice: Option<String>,
    pub evaluated_at: DateTime<Utc>,
    pub evaluation_time_ms: u64,
    pub cached: bool,
}

impl AuthorizationDecision {
    pub fn with_cached(&self, cached: bool) -> Self {
        Self {
            cached,
            ..self.clone()
        }
    }
}

use crate::core::authorization::Effect;
use regex::Regex;

/// A cross-cutting access-control policy (`IAMAccessControl`, spec §4.7).
/// Unlike permissions/PBAC, resource matching here is full regex — this
/// inconsistency versus prefix-wildcard matching elsewhere is intentional,
/// see `crate::core::authorization::matching`.
#[derive(Debug, Clone)]
pub struct IamAccessPolicy {
    pub id: String,
    pub subjects: Vec<String>,
    pub actions: Vec<String>,
    pub resource_patterns: Vec<String>,
    pub effect: Effect,
}

impl IamAccessPolicy {
    pub fn new(id: impl Into<String>, subjects: Vec<String>, actions: Vec<String>, resource_patterns: Vec<String>, effect: Effect) -> Self {
        Self {
            id: id.into(),
            subjects,
            actions,
            resource_patterns,
            effect,
        }
    }

    fn matches_subject(&self, subject: &str) -> bool {
        self.subjects.iter().any(|s| s == "*" || s == subject)
    }

    fn matches_action(&self, action: &str) -> bool {
        self.actions.iter().any(|a| a == "*" || a == action)
    }

    fn matches_resource(&self, resource: &str) -> bool {
        self.resource_patterns.iter().any(|pattern| {
            Regex::new(pattern)
                .map(|re| re.is_match(resource))
                .unwrap_or(false)
        })
    }

    pub fn matches(&self, subject: &str, action: &str, resource: &str) -> bool {
        self.matches_subject(subject) && self.matches_action(action) && self.matches_resource(resource)
    }
}

/// Evaluate a set of `IamAccessPolicy` with deny-overrides-allow; default
/// decision is deny.
pub fn evaluate_access(policies: &[IamAccessPolicy], subject: &str, action: &str, resource: &str) -> bool {
    let mut allowed = false;
    for policy in policies {
        if policy.matches(subject, action, resource) {
            match policy.effect {
                Effect::Deny => return false,
                Effect::Allow => allowed = true,
            }
        }
    }
    allowed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_decision_is_deny() {
        assert!(!evaluate_access(&[], "u1", "read", "orders"));
    }

    #[test]
    fn deny_overrides_allow_regardless_of_order() {
        let allow = IamAccessPolicy::new("p1", vec!["*".to_string()], vec!["read".to_string()], vec!["^orders$".to_string()], Effect::Allow);
        let deny = IamAccessPolicy::new("p2", vec!["u1".to_string()], vec!["read".to_string()], vec!["^orders$".to_string()], Effect::Deny);
        assert!(!evaluate_access(&[allow, deny], "u1", "read", "orders"));
    }

    #[test]
    fn regex_pattern_matches_full_resource_string() {
        let policy = IamAccessPolicy::new("p1", vec!["*".to_string()], vec!["*".to_string()], vec!["^documents/.*$".to_string()], Effect::Allow);
        assert!(policy.matches("u1", "read", "documents/report.pdf"));
        assert!(!policy.matches("u1", "read", "orders"));
    }
}

//! Resource/action pattern matching shared by RBAC permissions and PBAC
//! resource selectors.
//!
//! Spec §9 preserves an intentional inconsistency exactly: permissions and
//! PBAC resource selectors use exact match, `*`, or prefix wildcards
//! (`"users:*"`, `"documents/*"`); `IAMAccessControl` (the separate
//! cross-cutting security layer) uses full regex instead. Do not unify them.

/// Match a resource pattern against a concrete resource string.
///
/// - `"*"` matches anything.
/// - A pattern ending in `*` matches everything sharing that prefix
///   (covers both `"users:*"` and `"documents/*"` styles, whatever the
///   separator used before the star).
/// - Otherwise, exact match.
pub fn resource_matches(pattern: &str, resource: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    if let Some(prefix) = pattern.strip_suffix('*') {
        return resource.starts_with(prefix);
    }
    pattern == resource
}

/// Match a request action against a permission/policy's action list.
/// `"*"` in the list matches any action.
pub fn action_matches(actions: &[String], action: &str) -> bool {
    actions.iter().any(|a| a == "*" || a == action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_pattern_matches_everything() {
        assert!(resource_matches("*", "anything"));
    }

    #[test]
    fn colon_prefix_wildcard_matches_prefix() {
        assert!(resource_matches("users:*", "users:42"));
        assert!(!resource_matches("users:*", "orders:42"));
    }

    #[test]
    fn slash_prefix_wildcard_matches_prefix() {
        assert!(resource_matches("documents/*", "documents/report.pdf"));
    }

    #[test]
    fn exact_pattern_requires_exact_match() {
        assert!(resource_matches("orders", "orders"));
        assert!(!resource_matches("orders", "orders:1"));
    }

    #[test]
    fn action_wildcard_matches_any_action() {
        assert!(action_matches(&["*".to_string()], "delete"));
        assert!(action_matches(&["read".to_string()], "read"));
        assert!(!action_matches(&["read".to_string()], "write"));
    }
}

use crate::core::error::InvalidInputError;

/// Policy describing credential validation and rotation rules.
///
/// Intentionally simple and deterministic. Complex checks (real entropy
/// estimation, breach-list lookups) belong to adapters, not the core.
#[derive(Debug, Clone)]
pub struct CredentialPolicy {
    pub min_length: usize,
    pub require_complexity: bool,
    pub rotation_interval_days: Option<u32>,
    pub history_size: usize,
}

impl Default for CredentialPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_complexity: true,
            rotation_interval_days: Some(90),
            history_size: 5,
        }
    }
}

impl CredentialPolicy {
    pub fn validate_raw(&self, raw: &crate::core::credentials::RawCredential) -> Result<(), InvalidInputError> {
        raw.validate(self)
    }

    pub fn is_rotation_due(&self, days_since_rotation: u32) -> bool {
        match self.rotation_interval_days {
            Some(interval) => days_since_rotation >= interval,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_requires_rotation_at_ninety_days() {
        let policy = CredentialPolicy::default();
        assert!(!policy.is_rotation_due(89));
        assert!(policy.is_rotation_due(90));
    }
}

use crate::core::value::AttributeValue;
use std::collections::BTreeMap;

/// The tuple returned by `validateToken` per spec §4.3: validation outcomes
/// are data, never an `Err` — only `valid == true` when every check passes
/// (not-found → expired → revoked → consumed → not-before, in that order).
#[derive(Debug, Clone, Default)]
pub struct TokenValidationOutcome {
    pub valid: bool,
    pub expired: bool,
    pub revoked: bool,
    pub consumed: bool,
    pub not_yet_valid: bool,
    pub claims: Option<BTreeMap<String, AttributeValue>>,
    pub identity_id: Option<String>,
    pub scope: Option<Vec<String>>,
    pub error: Option<String>,
}

impl TokenValidationOutcome {
    pub fn not_found() -> Self {
        Self {
            error: Some("token not found".to_string()),
            ..Default::default()
        }
    }

    pub fn failure(field_set: impl FnOnce(&mut Self)) -> Self {
        let mut outcome = Self::default();
        field_set(&mut outcome);
        outcome
    }
}

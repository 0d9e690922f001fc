/// Attempted transition of an entity out of a state that does not permit it.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateConflictError {
    pub entity_kind: String,
    pub current_state: String,
    pub attempted: String,
}

impl StateConflictError {
    pub fn new(
        entity_kind: impl Into<String>,
        current_state: impl Into<String>,
        attempted: impl Into<String>,
    ) -> Self {
        Self {
            entity_kind: entity_kind.into(),
            current_state: current_state.into(),
            attempted: attempted.into(),
        }
    }
}

impl std::fmt::Display for StateConflictError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "cannot {} {} while in state {}",
            self.attempted, self.entity_kind, self.current_state
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_transition_context() {
        let err = StateConflictError::new("access-request", "rejected", "approve");
        assert_eq!(
            err.to_string(),
            "cannot approve access-request while in state rejected"
        );
    }
}

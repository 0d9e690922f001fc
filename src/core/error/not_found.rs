/// Lookup of an id that does not exist within a subsystem store.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotFoundError {
    pub entity_kind: String,
    pub id: String,
}

impl NotFoundError {
    pub fn new(entity_kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            entity_kind: entity_kind.into(),
            id: id.into(),
        }
    }
}

impl std::fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} not found: {}", self.entity_kind, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_kind_and_id() {
        let err = NotFoundError::new("role", "r1");
        assert_eq!(err.to_string(), "role not found: r1");
    }
}

/// Violations of role, SoD, or PBAC structural constraints.
///
/// Distinct from [`super::StateConflictError`]: a constraint violation is
/// rejected at the moment a mutation is attempted (e.g. assigning a role),
/// not because the target is in the wrong lifecycle state.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintKind {
    MutualExclusion,
    Prerequisite,
    Temporal,
    Cardinality,
    SeparationOfDuties,
}

impl std::fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::MutualExclusion => "mutual-exclusion",
            Self::Prerequisite => "prerequisite",
            Self::Temporal => "temporal",
            Self::Cardinality => "cardinality",
            Self::SeparationOfDuties => "separation-of-duties",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintViolationError {
    pub kind: ConstraintKind,
    pub detail: String,
}

impl ConstraintViolationError {
    pub fn new(kind: ConstraintKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn mutual_exclusion(detail: impl Into<String>) -> Self {
        Self::new(ConstraintKind::MutualExclusion, detail)
    }

    pub fn prerequisite(detail: impl Into<String>) -> Self {
        Self::new(ConstraintKind::Prerequisite, detail)
    }

    pub fn temporal(detail: impl Into<String>) -> Self {
        Self::new(ConstraintKind::Temporal, detail)
    }

    pub fn cardinality(detail: impl Into<String>) -> Self {
        Self::new(ConstraintKind::Cardinality, detail)
    }

    pub fn separation_of_duties(detail: impl Into<String>) -> Self {
        Self::new(ConstraintKind::SeparationOfDuties, detail)
    }
}

impl std::fmt::Display for ConstraintViolationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} constraint violated: {}", self.kind, self.detail)
    }
}

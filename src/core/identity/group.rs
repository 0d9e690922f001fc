use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A named collection of identities, referenced by role assignments and
/// PBAC subject selectors (`SubjectSelector::Group`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub member_ids: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
}

impl Group {
    pub fn new(id: impl Into<String>, name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            member_ids: BTreeSet::new(),
            created_at: now,
        }
    }

    pub fn contains(&self, identity_id: &str) -> bool {
        self.member_ids.contains(identity_id)
    }
}

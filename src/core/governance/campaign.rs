use crate::core::error::StateConflictError;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CampaignStatus {
    Draft,
    Active,
    InReview,
    Completed,
    Cancelled,
}

impl std::fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::InReview => "in-review",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// A certify/revoke decision recorded against one assignment under review.
#[derive(Debug, Clone)]
pub struct CertificationDecision {
    pub assignment_id: String,
    pub reviewer_id: String,
    pub certified: bool,
    pub decided_at: DateTime<Utc>,
}

/// An access certification campaign (spec §4.5): draft -> active (on
/// `start`) -> completed (on `complete`, which recomputes counts from the
/// recorded decisions).
#[derive(Debug, Clone)]
pub struct CertificationCampaign {
    pub id: String,
    pub name: String,
    pub status: CampaignStatus,
    pub scope_role_ids: Vec<String>,
    pub decisions: Vec<CertificationDecision>,
    pub certified_count: u64,
    pub revoked_count: u64,
    pub total_in_scope: u64,
    pub completion_percentage: f64,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl CertificationCampaign {
    pub fn new(id: impl Into<String>, name: impl Into<String>, scope_role_ids: Vec<String>, total_in_scope: u64, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: CampaignStatus::Draft,
            scope_role_ids,
            decisions: Vec::new(),
            certified_count: 0,
            revoked_count: 0,
            total_in_scope,
            completion_percentage: 0.0,
            created_at: now,
            started_at: None,
            completed_at: None,
        }
    }

    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), StateConflictError> {
        if self.status != CampaignStatus::Draft {
            return Err(StateConflictError::new("CertificationCampaign", self.status.to_string(), "start"));
        }
        self.status = CampaignStatus::Active;
        self.started_at = Some(now);
        Ok(())
    }

    /// Append a certify/revoke decision and recompute counters.
    pub fn record_decision(&mut self, assignment_id: impl Into<String>, reviewer_id: impl Into<String>, certified: bool, now: DateTime<Utc>) -> Result<(), StateConflictError> {
        if self.status != CampaignStatus::Active {
            return Err(StateConflictError::new("CertificationCampaign", self.status.to_string(), "record-decision"));
        }
        self.decisions.push(CertificationDecision {
            assignment_id: assignment_id.into(),
            reviewer_id: reviewer_id.into(),
            certified,
            decided_at: now,
        });
        self.recompute_counts();
        Ok(())
    }

    fn recompute_counts(&mut self) {
        self.certified_count = self.decisions.iter().filter(|d| d.certified).count() as u64;
        self.revoked_count = self.decisions.iter().filter(|d| !d.certified).count() as u64;
        self.completion_percentage = if self.total_in_scope == 0 {
            100.0
        } else {
            (self.decisions.len() as f64 / self.total_in_scope as f64) * 100.0
        };
    }

    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<(), StateConflictError> {
        if self.status != CampaignStatus::Active && self.status != CampaignStatus::InReview {
            return Err(StateConflictError::new("CertificationCampaign", self.status.to_string(), "complete"));
        }
        self.recompute_counts();
        self.status = CampaignStatus::Completed;
        self.completed_at = Some(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_then_complete_recomputes_counts() {
        let now = Utc::now();
        let mut campaign = CertificationCampaign::new("c1", "Q3 review", vec!["role-admin".to_string()], 2, now);
        campaign.start(now).unwrap();
        campaign.record_decision("a1", "reviewer1", true, now).unwrap();
        campaign.record_decision("a2", "reviewer1", false, now).unwrap();
        campaign.complete(now).unwrap();

        assert_eq!(campaign.status, CampaignStatus::Completed);
        assert_eq!(campaign.certified_count, 1);
        assert_eq!(campaign.revoked_count, 1);
        assert!((campaign.completion_percentage - 100.0).abs() < 1e-9);
    }

    #[test]
    fn cannot_start_twice() {
        let now = Utc::now();
        let mut campaign = CertificationCampaign::new("c1", "Q3 review", vec![], 0, now);
        campaign.start(now).unwrap();
        assert!(campaign.start(now).is_err());
    }
}

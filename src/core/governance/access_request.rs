use crate::core::error::StateConflictError;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRequestStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
    Fulfilled,
}

impl std::fmt::Display for AccessRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
            Self::Fulfilled => "fulfilled",
        };
        f.write_str(label)
    }
}

/// One approval or rejection recorded against an `AccessRequest`.
#[derive(Debug, Clone)]
pub struct AccessApproval {
    pub approver_id: String,
    pub approved: bool,
    pub level: usize,
    pub comment: Option<String>,
    pub decided_at: DateTime<Utc>,
}

/// A request for access, following pending -> {approved, rejected, cancelled}
/// -> fulfilled (spec §4.5). Transitions out of pending are the only legal
/// ones; `approve`/`reject`/`cancel`/`fulfill` each check this themselves.
#[derive(Debug, Clone)]
pub struct AccessRequest {
    pub id: String,
    pub requester_id: String,
    pub role_id: String,
    pub justification: String,
    pub status: AccessRequestStatus,
    pub approvals: Vec<AccessApproval>,
    pub created_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl AccessRequest {
    pub fn new(id: impl Into<String>, requester_id: impl Into<String>, role_id: impl Into<String>, justification: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            requester_id: requester_id.into(),
            role_id: role_id.into(),
            justification: justification.into(),
            status: AccessRequestStatus::Pending,
            approvals: Vec::new(),
            created_at: now,
            decided_at: None,
        }
    }

    fn ensure_pending(&self) -> Result<(), StateConflictError> {
        if self.status == AccessRequestStatus::Pending {
            Ok(())
        } else {
            Err(StateConflictError::new("AccessRequest", self.status.to_string(), "transition-from-pending"))
        }
    }

    pub fn record_decision(&mut self, approver_id: impl Into<String>, approved: bool, comment: Option<String>, now: DateTime<Utc>) -> Result<(), StateConflictError> {
        self.ensure_pending()?;
        let level = self.approvals.len() + 1;
        self.approvals.push(AccessApproval {
            approver_id: approver_id.into(),
            approved,
            level,
            comment,
            decided_at: now,
        });
        self.status = if approved { AccessRequestStatus::Approved } else { AccessRequestStatus::Rejected };
        self.decided_at = Some(now);
        Ok(())
    }

    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<(), StateConflictError> {
        self.ensure_pending()?;
        self.status = AccessRequestStatus::Cancelled;
        self.decided_at = Some(now);
        Ok(())
    }

    pub fn fulfill(&mut self) -> Result<(), StateConflictError> {
        if self.status != AccessRequestStatus::Approved {
            return Err(StateConflictError::new("AccessRequest", self.status.to_string(), "fulfill"));
        }
        self.status = AccessRequestStatus::Fulfilled;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_to_fulfilled_via_approval() {
        let now = Utc::now();
        let mut req = AccessRequest::new("r1", "u1", "role-admin", "need it", now);
        req.record_decision("approver1", true, None, now).unwrap();
        assert_eq!(req.status, AccessRequestStatus::Approved);
        req.fulfill().unwrap();
        assert_eq!(req.status, AccessRequestStatus::Fulfilled);
    }

    #[test]
    fn cannot_decide_twice() {
        let now = Utc::now();
        let mut req = AccessRequest::new("r1", "u1", "role-admin", "need it", now);
        req.record_decision("approver1", false, None, now).unwrap();
        assert!(req.record_decision("approver2", true, None, now).is_err());
    }

    #[test]
    fn fulfill_requires_approved_state() {
        let now = Utc::now();
        let mut req = AccessRequest::new("r1", "u1", "role-admin", "need it", now);
        assert!(req.fulfill().is_err());
    }
}

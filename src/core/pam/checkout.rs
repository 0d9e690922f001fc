use crate::core::error::StateConflictError;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutStatus {
    Pending,
    Active,
    Returned,
    Denied,
    Expired,
}

impl std::fmt::Display for CheckoutStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Returned => "returned",
            Self::Denied => "denied",
            Self::Expired => "expired",
        };
        f.write_str(label)
    }
}

/// A recording attached to one checked-out session.
#[derive(Debug, Clone)]
pub struct SessionRecording {
    pub checkout_id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub command_log: Vec<String>,
}

impl SessionRecording {
    pub fn new(checkout_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            checkout_id: checkout_id.into(),
            started_at: now,
            ended_at: None,
            command_log: Vec::new(),
        }
    }

    pub fn append(&mut self, command: impl Into<String>) {
        self.command_log.push(command.into());
    }

    pub fn end(&mut self, now: DateTime<Utc>) {
        self.ended_at = Some(now);
    }
}

/// One checkout of a privileged account, pending -> {active, denied} ->
/// {returned, expired}.
#[derive(Debug, Clone)]
pub struct Checkout {
    pub id: String,
    pub privileged_account_id: String,
    pub requester_id: String,
    pub status: CheckoutStatus,
    pub justification: String,
    pub requested_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub returned_at: Option<DateTime<Utc>>,
}

impl Checkout {
    pub fn new(id: impl Into<String>, privileged_account_id: impl Into<String>, requester_id: impl Into<String>, justification: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            privileged_account_id: privileged_account_id.into(),
            requester_id: requester_id.into(),
            status: CheckoutStatus::Pending,
            justification: justification.into(),
            requested_at: now,
            expires_at: None,
            returned_at: None,
        }
    }

    pub fn approve(&mut self, expires_at: DateTime<Utc>) -> Result<(), StateConflictError> {
        if self.status != CheckoutStatus::Pending {
            return Err(StateConflictError::new("Checkout", self.status.to_string(), "approve"));
        }
        self.status = CheckoutStatus::Active;
        self.expires_at = Some(expires_at);
        Ok(())
    }

    pub fn deny(&mut self) -> Result<(), StateConflictError> {
        if self.status != CheckoutStatus::Pending {
            return Err(StateConflictError::new("Checkout", self.status.to_string(), "deny"));
        }
        self.status = CheckoutStatus::Denied;
        Ok(())
    }

    pub fn return_account(&mut self, now: DateTime<Utc>) -> Result<(), StateConflictError> {
        if self.status != CheckoutStatus::Active {
            return Err(StateConflictError::new("Checkout", self.status.to_string(), "return"));
        }
        self.status = CheckoutStatus::Returned;
        self.returned_at = Some(now);
        Ok(())
    }

    pub fn is_expired(&self, reference: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(exp) if self.status == CheckoutStatus::Active && reference >= exp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_to_active_to_returned() {
        let now = Utc::now();
        let mut checkout = Checkout::new("c1", "pa1", "u1", "rotate secret", now);
        checkout.approve(now + chrono::Duration::minutes(60)).unwrap();
        assert_eq!(checkout.status, CheckoutStatus::Active);
        checkout.return_account(now + chrono::Duration::minutes(10)).unwrap();
        assert_eq!(checkout.status, CheckoutStatus::Returned);
    }

    #[test]
    fn cannot_return_a_pending_checkout() {
        let now = Utc::now();
        let mut checkout = Checkout::new("c1", "pa1", "u1", "rotate secret", now);
        assert!(checkout.return_account(now).is_err());
    }
}

use crate::core::error::AuthFailureReason;
use crate::core::token::Token;

/// Outcome status of `authenticate`/`verifyMFA`. Every outcome — success or
/// failure — is returned as data (spec §7: "all authentication outcomes
/// flow through the result object").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticationStatus {
    Success,
    Locked,
    MfaRequired,
    RiskDenied,
    Invalid,
}

#[derive(Debug, Clone)]
pub struct AuthenticationResult {
    pub status: AuthenticationStatus,
    pub identity_id: Option<String>,
    pub session_id: Option<String>,
    pub access_token: Option<Token>,
    pub refresh_token: Option<Token>,
    pub id_token: Option<Token>,
    pub mfa_challenge_id: Option<String>,
    pub failure_reason: Option<AuthFailureReason>,
}

impl AuthenticationResult {
    pub fn success(
        identity_id: impl Into<String>,
        session_id: impl Into<String>,
        access_token: Token,
        refresh_token: Token,
        id_token: Token,
    ) -> Self {
        Self {
            status: AuthenticationStatus::Success,
            identity_id: Some(identity_id.into()),
            session_id: Some(session_id.into()),
            access_token: Some(access_token),
            refresh_token: Some(refresh_token),
            id_token: Some(id_token),
            mfa_challenge_id: None,
            failure_reason: None,
        }
    }

    pub fn failure(status: AuthenticationStatus, reason: AuthFailureReason) -> Self {
        Self {
            status,
            identity_id: None,
            session_id: None,
            access_token: None,
            refresh_token: None,
            id_token: None,
            mfa_challenge_id: None,
            failure_reason: Some(reason),
        }
    }

    pub fn mfa_required(identity_id: impl Into<String>, challenge_id: impl Into<String>) -> Self {
        Self {
            status: AuthenticationStatus::MfaRequired,
            identity_id: Some(identity_id.into()),
            session_id: None,
            access_token: None,
            refresh_token: None,
            id_token: None,
            mfa_challenge_id: Some(challenge_id.into()),
            failure_reason: Some(AuthFailureReason::MfaRequired),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == AuthenticationStatus::Success
    }
}

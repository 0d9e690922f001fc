/// Structured reason behind a failed credential or risk check.
///
/// Per the spec's error-handling design, authentication outcomes are
/// surfaced through result objects (`AuthenticationResult`) rather than as
/// an `Err` of the top-level operation. This type exists for the narrow
/// internal paths (PAM checkout, directory bind) where a hard failure is the
/// only sensible contract, and is reused as the payload those result
/// objects carry in their `failure_reason` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFailureReason {
    IdentityNotFound,
    InvalidCredential,
    AccountLocked,
    MfaRequired,
    MfaInvalid,
    RiskDenied,
    PolicyDenied,
}

impl std::fmt::Display for AuthFailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::IdentityNotFound => "identity not found",
            Self::InvalidCredential => "invalid credential",
            Self::AccountLocked => "account locked",
            Self::MfaRequired => "mfa required",
            Self::MfaInvalid => "mfa invalid",
            Self::RiskDenied => "risk denied",
            Self::PolicyDenied => "policy denied",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthFailureError {
    pub reason: AuthFailureReason,
    pub detail: String,
}

impl AuthFailureError {
    pub fn new(reason: AuthFailureReason, detail: impl Into<String>) -> Self {
        Self {
            reason,
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for AuthFailureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.reason, self.detail)
    }
}

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MfaMethod {
    Totp,
    Sms,
    Email,
    WebAuthn,
}

impl std::fmt::Display for MfaMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Totp => "totp",
            Self::Sms => "sms",
            Self::Email => "email",
            Self::WebAuthn => "webauthn",
        };
        f.write_str(label)
    }
}

/// An identity's enrollment in an MFA method. Real TOTP/WebAuthn
/// verification is out of scope (spec §1 non-goals); verification here is a
/// clearly-marked stub (spec §4.2).
#[derive(Debug, Clone)]
pub struct MfaEnrollment {
    pub id: String,
    pub identity_id: String,
    pub method: MfaMethod,
    pub enrolled_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub active: bool,
}

/// A pending MFA challenge, valid for 5 minutes (spec §4.2).
#[derive(Debug, Clone)]
pub struct MfaChallenge {
    pub id: String,
    pub identity_id: String,
    pub method: MfaMethod,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub consumed: bool,
}

impl MfaChallenge {
    pub fn is_expired(&self, reference: DateTime<Utc>) -> bool {
        reference >= self.expires_at
    }

    pub fn is_pending(&self, reference: DateTime<Utc>) -> bool {
        !self.consumed && !self.is_expired(reference)
    }

    /// Stub verification: any 6-digit code, or the challenge id itself, is
    /// accepted. A conforming implementation substitutes real TOTP/WebAuthn
    /// verification here without changing the contract (spec §1, §4.2).
    pub fn code_is_acceptable(&self, code: &str) -> bool {
        code == self.id || (code.len() == 6 && code.chars().all(|c| c.is_ascii_digit()))
    }
}

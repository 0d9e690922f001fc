use crate::core::credentials::CredentialPolicy;
use crate::core::error::InvalidInputError;

/// A not-yet-hashed credential supplied by a caller (e.g. a password during
/// registration or rotation). Never persisted or logged; it is consumed by
/// a `PasswordHasher` port and discarded.
pub struct RawCredential {
    secret: String,
}

impl RawCredential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self { secret: secret.into() }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn validate(&self, policy: &CredentialPolicy) -> Result<(), InvalidInputError> {
        if self.secret.len() < policy.min_length {
            return Err(InvalidInputError::new(
                "credential",
                format!("must be at least {} characters", policy.min_length),
            ));
        }

        if policy.require_complexity {
            let has_digit = self.secret.chars().any(|c| c.is_ascii_digit());
            let has_alpha = self.secret.chars().any(|c| c.is_alphabetic());
            if !has_digit || !has_alpha {
                return Err(InvalidInputError::new(
                    "credential",
                    "must contain at least one letter and one digit",
                ));
            }
        }

        Ok(())
    }
}

impl std::fmt::Debug for RawCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RawCredential([REDACTED])")
    }
}

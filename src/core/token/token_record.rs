use crate::core::value::AttributeValue;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Access,
    Refresh,
    Id,
    AuthorizationCode,
    ApiKey,
    PersonalAccessToken,
    SamlAssertion,
}

impl TokenType {
    /// Default TTL per spec §4.3. Access token TTL instead comes from the
    /// signing config and is not covered by this table.
    pub fn default_ttl(self) -> chrono::Duration {
        match self {
            Self::Refresh => chrono::Duration::days(30),
            Self::Id => chrono::Duration::hours(1),
            Self::AuthorizationCode => chrono::Duration::minutes(10),
            Self::ApiKey => chrono::Duration::days(365),
            Self::PersonalAccessToken => chrono::Duration::days(90),
            Self::Access | Self::SamlAssertion => chrono::Duration::hours(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    Active,
    Revoked,
    Consumed,
    Expired,
}

/// The full internal record the Token Service owns for an issued token.
/// The caller only ever sees the opaque `Token` envelope plus whatever this
/// record's public accessors expose through `introspectToken`.
#[derive(Debug, Clone)]
pub struct TokenRecord {
    pub id: String,
    pub token_type: TokenType,
    pub status: TokenStatus,
    pub identity_id: String,
    pub client_id: Option<String>,
    pub scope: Vec<String>,
    pub audience: Option<String>,
    pub issuer: String,
    pub claims: BTreeMap<String, AttributeValue>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub not_before: Option<DateTime<Utc>>,
    pub fingerprint: String,
    pub parent_token_id: Option<String>,
}

impl TokenRecord {
    pub fn is_expired(&self, reference: DateTime<Utc>) -> bool {
        reference >= self.expires_at
    }

    pub fn is_not_yet_valid(&self, reference: DateTime<Utc>) -> bool {
        self.not_before.map(|nbf| reference < nbf).unwrap_or(false)
    }
}

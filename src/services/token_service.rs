//! Token Service: issuance, validation, revocation, refresh rotation, and
//! RFC 8693 exchange (spec §2 subsystem 4, §4.3).

use crate::adapters::crypto::fingerprint::fingerprint;
use crate::adapters::crypto::nonce::new_id;
use crate::adapters::crypto::token_envelope::{encode_envelope, EnvelopeHeader};
use crate::core::clock::Clock;
use crate::core::error::{IamError, IamResult};
use crate::core::token::{Token, TokenRecord, TokenStatus, TokenType, TokenValidationOutcome};
use crate::core::value::AttributeValue;
use crate::event::{IamEvent, ListenerRegistry};
use chrono::Duration;
use dashmap::DashMap;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct TokenSigningConfig {
    pub issuer: String,
    pub access_token_ttl: Duration,
}

impl Default for TokenSigningConfig {
    fn default() -> Self {
        Self {
            issuer: "iam-core".to_string(),
            access_token_ttl: Duration::hours(1),
        }
    }
}

pub struct IssueRequest {
    pub token_type: TokenType,
    pub identity_id: String,
    pub client_id: Option<String>,
    pub scope: Vec<String>,
    pub audience: Option<String>,
    pub claims: BTreeMap<String, AttributeValue>,
    pub parent_token_id: Option<String>,
}

impl IssueRequest {
    pub fn new(token_type: TokenType, identity_id: impl Into<String>) -> Self {
        Self {
            token_type,
            identity_id: identity_id.into(),
            client_id: None,
            scope: Vec::new(),
            audience: None,
            claims: BTreeMap::new(),
            parent_token_id: None,
        }
    }
}

pub struct TokenService {
    records: Arc<DashMap<String, TokenRecord>>,
    by_identity: Arc<DashMap<String, Vec<String>>>,
    config: TokenSigningConfig,
    clock: Arc<dyn Clock>,
    pub listeners: ListenerRegistry,
}

impl TokenService {
    pub fn new(config: TokenSigningConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            records: Arc::new(DashMap::new()),
            by_identity: Arc::new(DashMap::new()),
            config,
            clock,
            listeners: ListenerRegistry::new(),
        }
    }

    fn ttl_for(&self, token_type: TokenType) -> Duration {
        match token_type {
            TokenType::Access => self.config.access_token_ttl,
            other => other.default_ttl(),
        }
    }

    fn emit(&self, name: &str, token_id: &str) {
        let mut payload = BTreeMap::new();
        payload.insert("tokenId".to_string(), token_id.to_string().into());
        self.listeners.dispatch(&IamEvent::new(name, payload, self.clock.now()));
    }

    pub fn issue(&self, request: IssueRequest) -> (Token, TokenRecord) {
        let now = self.clock.now();
        let id = new_id();
        let expires_at = now + self.ttl_for(request.token_type);

        let header = EnvelopeHeader::default();
        let payload = json!({
            "jti": id,
            "iss": self.config.issuer,
            "sub": request.identity_id,
            "aud": request.audience,
            "iat": now.timestamp(),
            "exp": expires_at.timestamp(),
            "scope": request.scope,
        });
        let envelope = encode_envelope(&header, &payload, "unsigned");
        let fp = fingerprint(&envelope);

        let record = TokenRecord {
            id: id.clone(),
            token_type: request.token_type,
            status: TokenStatus::Active,
            identity_id: request.identity_id.clone(),
            client_id: request.client_id,
            scope: request.scope,
            audience: request.audience,
            issuer: self.config.issuer.clone(),
            claims: request.claims,
            issued_at: now,
            expires_at,
            not_before: None,
            fingerprint: fp,
            parent_token_id: request.parent_token_id,
        };

        self.records.insert(id.clone(), record.clone());
        self.by_identity.entry(request.identity_id).or_default().push(id.clone());
        self.emit("tokenIssued", &id);
        (Token::new(envelope), record)
    }

    pub fn validate(&self, token_id: &str) -> TokenValidationOutcome {
        let Some(record) = self.records.get(token_id) else {
            return TokenValidationOutcome::not_found();
        };
        let now = self.clock.now();

        if record.is_expired(now) {
            return TokenValidationOutcome::failure(|o| o.expired = true);
        }
        if record.status == TokenStatus::Revoked {
            return TokenValidationOutcome::failure(|o| o.revoked = true);
        }
        if record.status == TokenStatus::Consumed {
            return TokenValidationOutcome::failure(|o| o.consumed = true);
        }
        if record.is_not_yet_valid(now) {
            return TokenValidationOutcome::failure(|o| o.not_yet_valid = true);
        }

        TokenValidationOutcome {
            valid: true,
            expired: false,
            revoked: false,
            consumed: false,
            not_yet_valid: false,
            claims: Some(record.claims.clone()),
            identity_id: Some(record.identity_id.clone()),
            scope: Some(record.scope.clone()),
            error: None,
        }
    }

    pub fn validate_by_fingerprint(&self, fp: &str) -> TokenValidationOutcome {
        let Some(record) = self.records.iter().find(|r| r.fingerprint == fp) else {
            return TokenValidationOutcome::not_found();
        };
        self.validate(&record.id)
    }

    pub fn introspect(&self, token_id: &str) -> IamResult<TokenRecord> {
        self.records.get(token_id).map(|e| e.value().clone()).ok_or_else(|| IamError::not_found("TokenRecord", token_id))
    }

    pub fn revoke(&self, token_id: &str) -> IamResult<()> {
        let mut record = self.records.get_mut(token_id).ok_or_else(|| IamError::not_found("TokenRecord", token_id))?;
        record.status = TokenStatus::Revoked;
        drop(record);
        self.emit("tokenRevoked", token_id);
        Ok(())
    }

    pub fn consume(&self, token_id: &str) -> IamResult<()> {
        let mut record = self.records.get_mut(token_id).ok_or_else(|| IamError::not_found("TokenRecord", token_id))?;
        record.status = TokenStatus::Consumed;
        Ok(())
    }

    pub fn revoke_all_for_identity(&self, identity_id: &str) {
        if let Some(ids) = self.by_identity.get(identity_id) {
            for id in ids.value().clone() {
                let _ = self.revoke(&id);
            }
        }
    }

    pub fn revoke_by_client(&self, client_id: &str) {
        let ids: Vec<String> = self
            .records
            .iter()
            .filter(|e| e.value().client_id.as_deref() == Some(client_id))
            .map(|e| e.key().clone())
            .collect();
        for id in ids {
            let _ = self.revoke(&id);
        }
    }

    /// Enumerate an identity's live tokens without revoking them (spec §4.3
    /// "query by identity/client").
    pub fn tokens_for_identity(&self, identity_id: &str) -> Vec<TokenRecord> {
        self.by_identity
            .get(identity_id)
            .map(|ids| ids.value().iter().filter_map(|id| self.records.get(id).map(|e| e.value().clone())).collect())
            .unwrap_or_default()
    }

    /// Enumerate every live token issued to `client_id` without revoking them.
    pub fn tokens_for_client(&self, client_id: &str) -> Vec<TokenRecord> {
        self.records.iter().filter(|e| e.value().client_id.as_deref() == Some(client_id)).map(|e| e.value().clone()).collect()
    }

    /// Refresh rotation (spec §4.3/S5): validate the refresh token, revoke
    /// the access token it parents, issue a new access token, and update the
    /// refresh token's parent pointer to the new access token.
    pub fn refresh_access_token(&self, refresh_token_id: &str) -> IamResult<(Token, TokenRecord)> {
        let outcome = self.validate(refresh_token_id);
        if !outcome.valid {
            return Err(IamError::state_conflict("TokenRecord", "invalid-refresh-token", "refresh"));
        }
        let refresh_record = self.records.get(refresh_token_id).ok_or_else(|| IamError::not_found("TokenRecord", refresh_token_id))?;
        let identity_id = refresh_record.identity_id.clone();
        let scope = refresh_record.scope.clone();
        let client_id = refresh_record.client_id.clone();
        let old_access_id = refresh_record.parent_token_id.clone();
        drop(refresh_record);

        if let Some(old_access_id) = &old_access_id {
            let _ = self.revoke(old_access_id);
        }

        let mut request = IssueRequest::new(TokenType::Access, identity_id);
        request.scope = scope;
        request.client_id = client_id;
        let (new_token, new_record) = self.issue(request);

        let mut refresh_record = self.records.get_mut(refresh_token_id).ok_or_else(|| IamError::not_found("TokenRecord", refresh_token_id))?;
        refresh_record.parent_token_id = Some(new_record.id.clone());
        Ok((new_token, new_record))
    }

    /// RFC 8693 exchange. Subject token remains valid if not expired; claims
    /// on the new token record `exchanged_from`, `act`, `resource`, and
    /// `subject_token_type`.
    pub fn exchange(
        &self,
        subject_token_id: &str,
        actor_token_id: Option<&str>,
        requested_type: TokenType,
        subject_token_type_uri: &str,
        resource: Option<String>,
    ) -> IamResult<(Token, TokenRecord, Option<Token>)> {
        let subject_outcome = self.validate(subject_token_id);
        if !subject_outcome.valid {
            return Err(IamError::state_conflict("TokenRecord", "invalid-subject-token", "exchange"));
        }
        if let Some(actor_id) = actor_token_id {
            let actor_outcome = self.validate(actor_id);
            if !actor_outcome.valid {
                return Err(IamError::state_conflict("TokenRecord", "invalid-actor-token", "exchange"));
            }
        }

        let subject_record = self.records.get(subject_token_id).ok_or_else(|| IamError::not_found("TokenRecord", subject_token_id))?;
        let identity_id = subject_record.identity_id.clone();
        let scope = subject_record.scope.clone();
        drop(subject_record);

        let mut claims = BTreeMap::new();
        claims.insert("exchanged_from".to_string(), AttributeValue::from(subject_token_id));
        claims.insert("subject_token_type".to_string(), AttributeValue::from(subject_token_type_uri));
        if let Some(actor_id) = actor_token_id {
            claims.insert("act".to_string(), AttributeValue::from(actor_id));
        }
        if let Some(resource) = &resource {
            claims.insert("resource".to_string(), AttributeValue::from(resource.as_str()));
        }

        let mut request = IssueRequest::new(requested_type, identity_id.clone());
        request.scope = scope.clone();
        request.claims = claims;
        let (new_token, new_record) = self.issue(request);

        let refresh_token = if requested_type == TokenType::Access {
            let mut refresh_request = IssueRequest::new(TokenType::Refresh, identity_id);
            refresh_request.scope = scope;
            refresh_request.parent_token_id = Some(new_record.id.clone());
            Some(self.issue(refresh_request).0)
        } else {
            None
        };

        Ok((new_token, new_record, refresh_token))
    }

    /// RFC 8693 token-type URI → `TokenType` mapping (spec §6); any other
    /// URI defaults to access.
    pub fn token_type_for_uri(uri: &str) -> TokenType {
        match uri {
            "urn:ietf:params:oauth:token-type:access_token" => TokenType::Access,
            "urn:ietf:params:oauth:token-type:refresh_token" => TokenType::Refresh,
            "urn:ietf:params:oauth:token-type:id_token" => TokenType::Id,
            "urn:ietf:params:oauth:token-type:saml2" => TokenType::SamlAssertion,
            _ => TokenType::Access,
        }
    }

    pub fn cleanup_expired(&self) -> usize {
        let now = self.clock.now();
        let expired: Vec<String> = self
            .records
            .iter()
            .filter(|e| e.value().is_expired(now))
            .map(|e| e.key().clone())
            .collect();
        for id in &expired {
            self.records.remove(id);
        }
        expired.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::FixedClock;
    use chrono::Utc;

    fn service() -> (TokenService, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(Utc::now()));
        (TokenService::new(TokenSigningConfig::default(), clock.clone()), clock)
    }

    #[test]
    fn round_trip_validate_succeeds_before_expiry() {
        let (service, _clock) = service();
        let (_token, record) = service.issue(IssueRequest::new(TokenType::Access, "u1"));
        let outcome = service.validate(&record.id);
        assert!(outcome.valid);
    }

    #[test]
    fn revocation_is_terminal() {
        let (service, _clock) = service();
        let (_token, record) = service.issue(IssueRequest::new(TokenType::Access, "u1"));
        service.revoke(&record.id).unwrap();
        let outcome = service.validate(&record.id);
        assert!(!outcome.valid);
        assert!(outcome.revoked);
    }

    #[test]
    fn refresh_rotation_revokes_old_access_token() {
        let (service, _clock) = service();
        let (_access_token, access_record) = service.issue(IssueRequest::new(TokenType::Access, "u1"));
        let mut refresh_request = IssueRequest::new(TokenType::Refresh, "u1");
        refresh_request.parent_token_id = Some(access_record.id.clone());
        let (_refresh_token, refresh_record) = service.issue(refresh_request);

        let (_new_access, new_record) = service.refresh_access_token(&refresh_record.id).unwrap();

        assert!(!service.validate(&access_record.id).valid);
        assert!(service.validate(&new_record.id).valid);
        let refreshed = service.introspect(&refresh_record.id).unwrap();
        assert_eq!(refreshed.parent_token_id, Some(new_record.id));
    }

    #[test]
    fn exchange_keeps_subject_token_valid_and_records_provenance() {
        let (service, _clock) = service();
        let (_subject_token, subject_record) = service.issue(IssueRequest::new(TokenType::Access, "u1"));
        let (_new_token, new_record, refresh_token) = service
            .exchange(&subject_record.id, None, TokenType::Access, "urn:ietf:params:oauth:token-type:access_token", None)
            .unwrap();

        assert!(service.validate(&subject_record.id).valid);
        assert_eq!(new_record.claims.get("exchanged_from").and_then(|v| v.as_str()), Some(subject_record.id.as_str()));
        assert!(refresh_token.is_some());
    }

    #[test]
    fn expired_token_fails_validation() {
        let (service, clock) = service();
        let (_token, record) = service.issue(IssueRequest::new(TokenType::Access, "u1"));
        clock.advance(Duration::hours(2));
        let outcome = service.validate(&record.id);
        assert!(!outcome.valid);
        assert!(outcome.expired);
    }
}

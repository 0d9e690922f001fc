//! Authentication Engine: login flow, lockout state machine, MFA
//! enrollment/challenge, and authentication policy selection (spec §2
//! subsystem 2, §4.2).

use crate::adapters::crypto::nonce::new_id;
use crate::core::authentication::{
    AuthPolicy, AuthenticationResult, AuthenticationStatus, LoginHistoryEntry, MfaChallenge,
    MfaEnrollment, MfaMethod,
};
use crate::core::clock::Clock;
use crate::core::error::{AuthFailureReason, IamError, IamResult};
use crate::core::identity::IdentityStatus;
use crate::services::{CredentialManager, IdentityStore, IssueRequest, SessionManager, TokenService};
use crate::core::token::TokenType;
use crate::event::{IamEvent, ListenerRegistry};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct LoginRequest {
    pub login: String,
    pub method: String,
    pub password: Option<String>,
    pub mfa_code: Option<String>,
    pub mfa_challenge_id: Option<String>,
    pub ip_address: Option<String>,
    pub device_fingerprint: Option<String>,
    pub country: Option<String>,
    pub application: Option<String>,
    pub risk_score: Option<u8>,
}

impl LoginRequest {
    pub fn new(login: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            method: method.into(),
            password: None,
            mfa_code: None,
            mfa_challenge_id: None,
            ip_address: None,
            device_fingerprint: None,
            country: None,
            application: None,
            risk_score: None,
        }
    }
}

const MFA_CHALLENGE_TTL: Duration = Duration::minutes(5);

pub struct AuthenticationEngine {
    identities: Arc<IdentityStore>,
    credentials: Arc<CredentialManager>,
    sessions: Arc<SessionManager>,
    tokens: Arc<TokenService>,
    policies: Arc<DashMap<String, AuthPolicy>>,
    failed_attempts: Arc<DashMap<String, u32>>,
    lockouts: Arc<DashMap<String, DateTime<Utc>>>,
    mfa_enrollments: Arc<DashMap<String, Vec<MfaEnrollment>>>,
    mfa_challenges: Arc<DashMap<String, MfaChallenge>>,
    login_history: Arc<DashMap<String, Vec<LoginHistoryEntry>>>,
    clock: Arc<dyn Clock>,
    pub listeners: ListenerRegistry,
}

impl AuthenticationEngine {
    pub fn new(
        identities: Arc<IdentityStore>,
        credentials: Arc<CredentialManager>,
        sessions: Arc<SessionManager>,
        tokens: Arc<TokenService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            identities,
            credentials,
            sessions,
            tokens,
            policies: Arc::new(DashMap::new()),
            failed_attempts: Arc::new(DashMap::new()),
            lockouts: Arc::new(DashMap::new()),
            mfa_enrollments: Arc::new(DashMap::new()),
            mfa_challenges: Arc::new(DashMap::new()),
            login_history: Arc::new(DashMap::new()),
            clock,
            listeners: ListenerRegistry::new(),
        }
    }

    fn emit(&self, name: &str, identity_id: &str) {
        let mut payload = BTreeMap::new();
        payload.insert("id".to_string(), identity_id.to_string().into());
        self.listeners.dispatch(&IamEvent::new(name, payload, self.clock.now()));
    }

    pub fn create_auth_policy(&self, policy: AuthPolicy) -> AuthPolicy {
        self.policies.insert(policy.id.clone(), policy.clone());
        policy
    }

    pub fn get_auth_policy(&self, id: &str) -> IamResult<AuthPolicy> {
        self.policies.get(id).map(|e| e.value().clone()).ok_or_else(|| IamError::not_found("AuthPolicy", id))
    }

    pub fn list_auth_policies(&self) -> Vec<AuthPolicy> {
        self.policies.iter().map(|e| e.value().clone()).collect()
    }

    pub fn delete_auth_policy(&self, id: &str) -> IamResult<()> {
        self.policies.remove(id).map(|_| ()).ok_or_else(|| IamError::not_found("AuthPolicy", id))
    }

    /// Highest-priority enabled policy whose conditions match, or `None`
    /// if no stored policy applies (caller falls back to a default).
    pub fn evaluate_auth_policy(&self, request: &LoginRequest) -> Option<AuthPolicy> {
        let mut candidates: Vec<AuthPolicy> = self
            .policies
            .iter()
            .filter(|e| e.enabled)
            .filter(|e| {
                e.conditions.matches(
                    e.condition_mode,
                    request.ip_address.as_deref(),
                    request.country.as_deref(),
                    request.device_fingerprint.as_deref(),
                    request.application.as_deref(),
                )
            })
            .map(|e| e.value().clone())
            .collect();
        candidates.sort_by(|a, b| b.priority.cmp(&a.priority));
        candidates.into_iter().next()
    }

    fn default_policy() -> AuthPolicy {
        AuthPolicy::new("__default__", i32::MIN)
    }

    pub fn is_locked(&self, identity_id: &str) -> bool {
        let now = self.clock.now();
        match self.lockouts.get(identity_id).map(|e| *e.value()) {
            Some(locked_until) if now < locked_until => true,
            Some(_) => {
                self.lockouts.remove(identity_id);
                self.failed_attempts.remove(identity_id);
                let _ = self.identities.set_status(identity_id, IdentityStatus::Active);
                false
            }
            None => false,
        }
    }

    pub fn get_failed_attempt_count(&self, identity_id: &str) -> u32 {
        self.failed_attempts.get(identity_id).map(|e| *e.value()).unwrap_or(0)
    }

    pub fn reset_failed_attempts(&self, identity_id: &str) {
        self.failed_attempts.remove(identity_id);
        self.lockouts.remove(identity_id);
    }

    fn record_failure(&self, identity_id: &str, policy: &AuthPolicy) {
        let mut count = self.failed_attempts.entry(identity_id.to_string()).or_insert(0);
        *count += 1;
        if *count >= policy.max_failed_attempts {
            let locked_until = self.clock.now() + Duration::minutes(policy.lockout_duration_minutes);
            self.lockouts.insert(identity_id.to_string(), locked_until);
            let _ = self.identities.set_status(identity_id, IdentityStatus::Locked);
            self.emit("accountLocked", identity_id);
        }
    }

    fn record_login_history(&self, identity_id: &str, success: bool, method: &str, ip: Option<String>, failure_reason: Option<String>) {
        let entry = LoginHistoryEntry {
            identity_id: identity_id.to_string(),
            timestamp: self.clock.now(),
            success,
            ip_address: ip,
            method: method.to_string(),
            failure_reason,
        };
        self.login_history.entry(identity_id.to_string()).or_default().push(entry);
    }

    pub fn get_login_history(&self, identity_id: &str) -> Vec<LoginHistoryEntry> {
        self.login_history.get(identity_id).map(|e| e.value().clone()).unwrap_or_default()
    }

    pub fn enroll_mfa(&self, identity_id: impl Into<String>, method: MfaMethod) -> MfaEnrollment {
        let identity_id = identity_id.into();
        let enrollment = MfaEnrollment {
            id: new_id(),
            identity_id: identity_id.clone(),
            method,
            enrolled_at: self.clock.now(),
            last_used_at: None,
            active: true,
        };
        self.mfa_enrollments.entry(identity_id).or_default().push(enrollment.clone());
        enrollment
    }

    pub fn unenroll_mfa(&self, identity_id: &str, enrollment_id: &str) -> IamResult<()> {
        let mut enrollments = self.mfa_enrollments.get_mut(identity_id).ok_or_else(|| IamError::not_found("MfaEnrollment", enrollment_id))?;
        let before = enrollments.len();
        enrollments.retain(|e| e.id != enrollment_id);
        if enrollments.len() == before {
            return Err(IamError::not_found("MfaEnrollment", enrollment_id));
        }
        Ok(())
    }

    pub fn get_mfa_enrollments(&self, identity_id: &str) -> Vec<MfaEnrollment> {
        self.mfa_enrollments.get(identity_id).map(|e| e.value().clone()).unwrap_or_default()
    }

    fn create_mfa_challenge(&self, identity_id: &str, method: MfaMethod) -> MfaChallenge {
        let now = self.clock.now();
        let challenge = MfaChallenge {
            id: new_id(),
            identity_id: identity_id.to_string(),
            method,
            created_at: now,
            expires_at: now + MFA_CHALLENGE_TTL,
            consumed: false,
        };
        self.mfa_challenges.insert(challenge.id.clone(), challenge.clone());
        challenge
    }

    /// Verify a previously-issued challenge by id, consuming it on success.
    /// Used both by the inline (`mfaCode` + `mfaToken` in the same request)
    /// and the two-step (`MfaRequired` result, then a separate call) paths
    /// (spec §9 open question: both paths are preserved).
    pub fn verify_mfa(&self, challenge_id: &str, code: &str) -> bool {
        let Some(mut challenge) = self.mfa_challenges.get_mut(challenge_id) else {
            return false;
        };
        let now = self.clock.now();
        if !challenge.is_pending(now) || !challenge.code_is_acceptable(code) {
            return false;
        }
        challenge.consumed = true;
        true
    }

    fn mint_success_result(&self, identity_id: &str, request: &LoginRequest) -> AuthenticationResult {
        let session = self.sessions.create_session(new_id(), identity_id, request.device_fingerprint.clone(), request.ip_address.clone());
        let (access_token, access_record) = self.tokens.issue(IssueRequest::new(TokenType::Access, identity_id));
        let mut refresh_request = IssueRequest::new(TokenType::Refresh, identity_id);
        refresh_request.parent_token_id = Some(access_record.id.clone());
        let (refresh_token, _refresh_record) = self.tokens.issue(refresh_request);
        let (id_token, _id_record) = self.tokens.issue(IssueRequest::new(TokenType::Id, identity_id));

        self.reset_failed_attempts(identity_id);
        self.record_login_history(identity_id, true, &request.method, request.ip_address.clone(), None);
        self.emit("loginSuccess", identity_id);
        AuthenticationResult::success(identity_id, session.id, access_token, refresh_token, id_token)
    }

    fn fail(&self, identity_id: Option<&str>, request: &LoginRequest, status: AuthenticationStatus, reason: AuthFailureReason) -> AuthenticationResult {
        if let Some(identity_id) = identity_id {
            self.record_login_history(identity_id, false, &request.method, request.ip_address.clone(), Some(reason.to_string()));
        }
        AuthenticationResult::failure(status, reason)
    }

    /// The login flow (spec §4.2): identity resolution, lockout check,
    /// policy selection, method gating, credential verification, risk
    /// delegation, MFA, and token/session minting.
    pub fn authenticate(&self, request: LoginRequest) -> AuthenticationResult {
        let Some(identity) = self.identities.find_by_username_or_email(&request.login) else {
            return self.fail(None, &request, AuthenticationStatus::Invalid, AuthFailureReason::IdentityNotFound);
        };

        if !identity.is_usable() {
            return self.fail(Some(&identity.id), &request, AuthenticationStatus::Invalid, AuthFailureReason::AccountLocked);
        }

        if self.is_locked(&identity.id) {
            return self.fail(Some(&identity.id), &request, AuthenticationStatus::Locked, AuthFailureReason::AccountLocked);
        }

        let policy = self.evaluate_auth_policy(&request).unwrap_or_else(Self::default_policy);

        if !policy.allowed_methods.iter().any(|m| m == &request.method) {
            return self.fail(Some(&identity.id), &request, AuthenticationStatus::Invalid, AuthFailureReason::PolicyDenied);
        }

        let Some(password) = &request.password else {
            return self.fail(Some(&identity.id), &request, AuthenticationStatus::Invalid, AuthFailureReason::InvalidCredential);
        };
        if !self.credentials.verify_credential(&identity.id, password) {
            self.record_failure(&identity.id, &policy);
            return self.fail(Some(&identity.id), &request, AuthenticationStatus::Invalid, AuthFailureReason::InvalidCredential);
        }

        if let Some(score) = request.risk_score {
            if score >= policy.risk_threshold {
                return self.fail(Some(&identity.id), &request, AuthenticationStatus::RiskDenied, AuthFailureReason::RiskDenied);
            }
        }

        if policy.mfa_required {
            match &request.mfa_challenge_id {
                Some(challenge_id) => {
                    let code = request.mfa_code.as_deref().unwrap_or("");
                    if !self.verify_mfa(challenge_id, code) {
                        return self.fail(Some(&identity.id), &request, AuthenticationStatus::Invalid, AuthFailureReason::MfaInvalid);
                    }
                }
                None => {
                    let enrollments = self.get_mfa_enrollments(&identity.id);
                    let method = enrollments.iter().find(|e| e.active).map(|e| e.method.clone()).unwrap_or(MfaMethod::Totp);
                    let challenge = self.create_mfa_challenge(&identity.id, method);
                    self.emit("mfaRequired", &identity.id);
                    return AuthenticationResult::mfa_required(identity.id.clone(), challenge.id);
                }
            }
        }

        self.mint_success_result(&identity.id, &request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::crypto::password_hash::Argon2PasswordHasher;
    use crate::core::clock::FixedClock;
    use crate::core::credentials::{CredentialPolicy, RawCredential};
    use crate::core::identity::IdentityType;
    use crate::core::session::SessionConfig;
    use crate::services::token_service::TokenSigningConfig;

    fn engine() -> (AuthenticationEngine, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(Utc::now()));
        let identities = Arc::new(IdentityStore::new(clock.clone()));
        let credentials = Arc::new(CredentialManager::new(CredentialPolicy::default(), Arc::new(Argon2PasswordHasher::default()), clock.clone()));
        let sessions = Arc::new(SessionManager::new(SessionConfig::default(), clock.clone()));
        let tokens = Arc::new(TokenService::new(TokenSigningConfig::default(), clock.clone()));

        identities.create_identity("u1", IdentityType::User, "alice");
        credentials.set_credential("c1", "u1", &RawCredential::new("correct-horse-battery")).unwrap();

        (AuthenticationEngine::new(identities, credentials, sessions, tokens, clock.clone()), clock)
    }

    #[test]
    fn successful_login_mints_tokens_and_session() {
        let (engine, _clock) = engine();
        let mut request = LoginRequest::new("alice", "password");
        request.password = Some("correct-horse-battery".to_string());
        let result = engine.authenticate(request);
        assert!(result.is_success());
        assert!(result.access_token.is_some());
        assert!(result.session_id.is_some());
    }

    #[test]
    fn wrong_password_is_invalid_and_counts_toward_lockout() {
        let (engine, _clock) = engine();
        let mut request = LoginRequest::new("alice", "password");
        request.password = Some("wrong".to_string());
        let result = engine.authenticate(request);
        assert_eq!(result.status, AuthenticationStatus::Invalid);
        assert_eq!(engine.get_failed_attempt_count("u1"), 1);
    }

    #[test]
    fn lockout_triggers_after_max_failed_attempts() {
        let (engine, _clock) = engine();
        let policy = AuthPolicy::new("strict", 10);
        engine.create_auth_policy(AuthPolicy { max_failed_attempts: 2, ..policy });

        for _ in 0..2 {
            let mut request = LoginRequest::new("alice", "password");
            request.password = Some("wrong".to_string());
            engine.authenticate(request);
        }

        assert!(engine.is_locked("u1"));
        let mut request = LoginRequest::new("alice", "password");
        request.password = Some("correct-horse-battery".to_string());
        let result = engine.authenticate(request);
        assert_eq!(result.status, AuthenticationStatus::Locked);
    }

    #[test]
    fn mfa_required_returns_challenge_then_completes_on_verify() {
        let (engine, _clock) = engine();
        let policy = AuthPolicy::new("mfa", 10);
        engine.create_auth_policy(AuthPolicy { mfa_required: true, ..policy });

        let mut request = LoginRequest::new("alice", "password");
        request.password = Some("correct-horse-battery".to_string());
        let first = engine.authenticate(request);
        assert_eq!(first.status, AuthenticationStatus::MfaRequired);
        let challenge_id = first.mfa_challenge_id.unwrap();

        let mut second = LoginRequest::new("alice", "password");
        second.password = Some("correct-horse-battery".to_string());
        second.mfa_challenge_id = Some(challenge_id);
        second.mfa_code = Some("123456".to_string());
        let result = engine.authenticate(second);
        assert!(result.is_success());
    }
}

//! Orchestrator: instantiates every subsystem, applies seed configuration,
//! fans every subsystem event into the Monitoring counters and a
//! crate-level event bus, and tracks init/shutdown lifecycle (spec §2
//! subsystem 14, §4.8).

use crate::config::IamConfig;
use crate::core::clock::{Clock, SystemClock};
use crate::core::error::IamResult;
use crate::event::{IamEvent, ListenerRegistry};
use crate::services::{
    AuthenticationEngine, AuthorizationEngine, CredentialManager, DirectoryService,
    FederationManager, GovernanceEngine, IdentityStore, Monitoring, PrivilegedAccessManager,
    RiskEngine, SecurityService, SessionManager, TokenService,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::adapters::crypto::password_hash::Argon2PasswordHasher;

/// Every subsystem, constructed and wired together. Each field is a
/// clonable `Arc` handle so callers can hold one alongside the orchestrator.
pub struct IamOrchestrator {
    pub identities: Arc<IdentityStore>,
    pub credentials: Arc<CredentialManager>,
    pub directory: Arc<DirectoryService>,
    pub sessions: Arc<SessionManager>,
    pub tokens: Arc<TokenService>,
    pub authorization: Arc<AuthorizationEngine>,
    pub authentication: Arc<AuthenticationEngine>,
    pub federation: Arc<FederationManager>,
    pub risk: Arc<RiskEngine>,
    pub governance: Arc<GovernanceEngine>,
    pub pam: Arc<PrivilegedAccessManager>,
    pub security: Arc<SecurityService>,
    pub monitoring: Arc<Monitoring>,
    pub events: Arc<ListenerRegistry>,
    initialized: AtomicBool,
    destroyed: AtomicBool,
}

/// Register a counter-and-rebroadcast listener on `registry`: every event
/// increments `{eventName}` on `monitoring` and is re-dispatched onto
/// `events` (spec §4.8 "registers a callback per subsystem event").
fn wire(registry: &ListenerRegistry, monitoring: Arc<Monitoring>, events: Arc<ListenerRegistry>) {
    registry.register(Box::new(move |event: &IamEvent| {
        monitoring.increment(&event.name);
        events.dispatch(event);
        Ok(())
    }));
}

impl IamOrchestrator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_config(clock, &IamConfig::default())
    }

    /// Construct every subsystem. `session_config` and `token_signing_config`
    /// are consumed here, at construction time, since neither
    /// `SessionManager` nor `TokenService` exposes a way to swap its config
    /// once stores are live; every other seed collection in `config` is
    /// applied later and repeatably via `init`.
    pub fn with_config(clock: Arc<dyn Clock>, config: &IamConfig) -> Self {
        let identities = Arc::new(IdentityStore::new(clock.clone()));
        let hasher = Arc::new(Argon2PasswordHasher::default());
        let credential_policy = config.password_policy.clone().unwrap_or_default();
        let credentials = Arc::new(CredentialManager::new(credential_policy, hasher.clone(), clock.clone()));
        let directory = Arc::new(DirectoryService::new(clock.clone()));
        let sessions = Arc::new(SessionManager::new(config.session_config.clone(), clock.clone()));
        let tokens = Arc::new(TokenService::new(config.token_signing_config.clone(), clock.clone()));
        let authorization = Arc::new(AuthorizationEngine::new(clock.clone()));
        let authentication = Arc::new(AuthenticationEngine::new(
            identities.clone(),
            credentials.clone(),
            sessions.clone(),
            tokens.clone(),
            clock.clone(),
        ));
        let federation = Arc::new(FederationManager::new(identities.clone(), tokens.clone(), clock.clone()));
        let risk = Arc::new(RiskEngine::new(clock.clone()));
        let governance = Arc::new(GovernanceEngine::new(authorization.clone(), clock.clone()));
        let pam = Arc::new(PrivilegedAccessManager::new(hasher, clock.clone()));
        let security = Arc::new(SecurityService::new(config.audit_enabled, clock.clone()));
        let monitoring = Arc::new(Monitoring::new(clock.clone()));
        let events = Arc::new(ListenerRegistry::new());

        wire(&identities.listeners, monitoring.clone(), events.clone());
        wire(&sessions.listeners, monitoring.clone(), events.clone());
        wire(&tokens.listeners, monitoring.clone(), events.clone());
        wire(&federation.listeners, monitoring.clone(), events.clone());
        wire(&risk.listeners, monitoring.clone(), events.clone());
        wire(&governance.listeners, monitoring.clone(), events.clone());
        wire(&pam.listeners, monitoring.clone(), events.clone());
        wire(&authorization.listeners, monitoring.clone(), events.clone());
        wire(&authentication.listeners, monitoring.clone(), events.clone());
        wire(&credentials.listeners, monitoring.clone(), events.clone());
        wire(&directory.listeners, monitoring.clone(), events.clone());
        wire(&security.listeners, monitoring.clone(), events.clone());

        Self {
            identities,
            credentials,
            directory,
            sessions,
            tokens,
            authorization,
            authentication,
            federation,
            risk,
            governance,
            pam,
            security,
            monitoring,
            events,
            initialized: AtomicBool::new(false),
            destroyed: AtomicBool::new(false),
        }
    }

    pub fn with_system_clock() -> Self {
        Self::new(Arc::new(SystemClock))
    }

    /// Apply seed configuration. Idempotent: a second call is a no-op
    /// (spec §4.8 "`init` is idempotent").
    pub async fn init(&self, config: &IamConfig) -> IamResult<()> {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        for identity in &config.identities {
            self.identities.create_identity(identity.id.clone(), identity.identity_type, identity.username.clone());
        }
        for org in &config.organizations {
            self.identities.create_organization(org.clone());
        }
        for group in &config.groups {
            self.identities.create_group(group.clone());
        }
        for role in &config.roles {
            self.authorization.create_role(role.clone());
        }
        for policy in &config.access_policies {
            self.authorization.create_policy(policy.clone());
        }
        for policy in &config.authentication_policies {
            self.authentication.create_auth_policy(policy.clone());
        }
        for idp in &config.identity_providers {
            self.federation.register_idp(idp.clone());
        }
        for sp in &config.service_providers {
            self.federation.register_sp(sp.clone());
        }
        for sso in &config.sso_configs {
            self.federation.register_sso_config(sso.clone());
        }
        for rule in &config.risk_scoring_rules {
            self.risk.register_rule(rule.clone());
        }
        for indicator in &config.threat_indicators {
            self.risk.register_threat_indicator(indicator.clone());
        }
        for policy in &config.sod_policies {
            self.governance.register_sod_policy(policy.clone());
        }
        for account in &config.privileged_accounts {
            self.pam.register_account(account.name.clone(), account.system.clone(), &account.initial_secret);
        }
        for rule in &config.alert_rules {
            self.monitoring.register_alert_rule(rule.clone());
        }
        for policy in &config.iam_access_policies {
            self.security.register_access_policy(policy.clone());
        }
        for rule in &config.masking_rules {
            self.security.register_masking_rule(rule.clone());
        }

        Ok(())
    }

    /// Point-in-time snapshot of every named counter plus uptime, with
    /// subsystem-size gauges (spec §4.8 "a snapshot of totals") layered on
    /// top of `Monitoring`'s own counter-only snapshot.
    pub fn get_metrics(&self) -> crate::core::monitoring::MetricsSnapshot {
        let mut snapshot = self.monitoring.get_metrics();
        snapshot.gauges.insert("identities".to_string(), self.identities.list_identities().len() as u64);
        snapshot.gauges.insert("directoryEntries".to_string(), self.directory.len() as u64);
        snapshot
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    /// Flip the destroyed flag and shut monitoring down. Idempotent.
    pub async fn shutdown(&self) -> IamResult<()> {
        if self.destroyed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.monitoring.shutdown();
        Ok(())
    }
}

impl Default for IamOrchestrator {
    fn default() -> Self {
        Self::with_system_clock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SeedIdentity;
    use crate::core::clock::FixedClock;
    use crate::core::identity::IdentityType;
    use chrono::Utc;

    fn orchestrator() -> IamOrchestrator {
        IamOrchestrator::new(Arc::new(FixedClock::new(Utc::now())))
    }

    #[tokio::test]
    async fn init_applies_seed_identities_and_is_idempotent() {
        let orchestrator = orchestrator();
        let mut config = IamConfig::default();
        config.identities.push(SeedIdentity {
            id: "u1".to_string(),
            identity_type: IdentityType::User,
            username: "alice".to_string(),
        });

        orchestrator.init(&config).await.unwrap();
        assert!(orchestrator.identities.get_identity("u1").is_ok());

        config.identities.push(SeedIdentity {
            id: "u2".to_string(),
            identity_type: IdentityType::User,
            username: "bob".to_string(),
        });
        orchestrator.init(&config).await.unwrap();
        assert!(orchestrator.identities.get_identity("u2").is_err());
    }

    #[tokio::test]
    async fn subsystem_events_increment_monitoring_counters() {
        let orchestrator = orchestrator();
        orchestrator.identities.create_identity("u1", IdentityType::User, "alice");
        assert_eq!(orchestrator.monitoring.get_counter("identityCreated"), 1);
    }

    #[tokio::test]
    async fn shutdown_flips_destroyed_flag_and_stops_monitoring() {
        let orchestrator = orchestrator();
        assert!(!orchestrator.is_destroyed());
        orchestrator.shutdown().await.unwrap();
        assert!(orchestrator.is_destroyed());
        assert!(orchestrator.monitoring.is_shut_down());
    }
}

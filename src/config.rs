//! Orchestrator configuration: the seed collections applied at `init`
//! (spec §6 "Configuration object").

use crate::core::authorization::{AccessPolicy, Role};
use crate::core::authentication::AuthPolicy;
use crate::core::credentials::CredentialPolicy;
use crate::core::federation::{IdentityProvider, ServiceProvider, SsoConfig};
use crate::core::governance::SodPolicy;
use crate::core::identity::{Group, IdentityType, Organization};
use crate::core::risk::{ScoringRule, ThreatIntelIndicator};
use crate::core::security::{IamAccessPolicy, MaskingRule};
use crate::core::session::SessionConfig;
use crate::services::token_service::TokenSigningConfig;

/// A seed identity: just enough to call `IdentityStore::create_identity`.
#[derive(Debug, Clone)]
pub struct SeedIdentity {
    pub id: String,
    pub identity_type: IdentityType,
    pub username: String,
}

/// A seed privileged account: `PrivilegedAccessManager::register_account`
/// mints the id and vault itself, so only the human-facing fields are here.
#[derive(Debug, Clone)]
pub struct SeedPrivilegedAccount {
    pub name: String,
    pub system: String,
    pub initial_secret: String,
}

/// The recognized seed collections (spec §6). Every field defaults to
/// empty/`None` so a caller can seed only what it needs.
#[derive(Debug, Clone, Default)]
pub struct IamConfig {
    pub identities: Vec<SeedIdentity>,
    pub organizations: Vec<Organization>,
    pub groups: Vec<Group>,
    pub roles: Vec<Role>,
    pub access_policies: Vec<AccessPolicy>,
    pub authentication_policies: Vec<AuthPolicy>,
    pub password_policy: Option<CredentialPolicy>,
    pub identity_providers: Vec<IdentityProvider>,
    pub service_providers: Vec<ServiceProvider>,
    pub sso_configs: Vec<SsoConfig>,
    pub risk_scoring_rules: Vec<ScoringRule>,
    pub sod_policies: Vec<SodPolicy>,
    pub privileged_accounts: Vec<SeedPrivilegedAccount>,
    pub threat_indicators: Vec<ThreatIntelIndicator>,
    pub alert_rules: Vec<crate::core::monitoring::AlertRule>,
    pub iam_access_policies: Vec<IamAccessPolicy>,
    pub masking_rules: Vec<MaskingRule>,
    pub session_config: SessionConfig,
    pub token_signing_config: TokenSigningConfig,
    pub audit_enabled: bool,
}

//! Federation Manager: IdP/SP registries, SAML request/response, OIDC
//! authorization-code flow with PKCE, and JIT provisioning (spec §2
//! subsystem 6, §4.6).

use crate::adapters::crypto::fingerprint::fingerprint;
use crate::adapters::crypto::nonce::{new_id, pkce_s256_challenge, random_url_safe_token};
use crate::core::clock::Clock;
use crate::core::error::{IamError, IamResult};
use crate::core::federation::{
    IdentityProvider, OidcAuthorizationRequest, OidcTokenResponse, ProtocolSettings, SamlLogoutRequest,
    SamlRequest, SamlResponse, ServiceProvider, SsoConfig,
};
use crate::core::identity::{Identity, IdentityType};
use crate::core::token::TokenType;
use crate::core::value::AttributeValue;
use crate::event::{IamEvent, ListenerRegistry};
use crate::services::{IdentityStore, IssueRequest, TokenService};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Percent-encode per RFC 3986's unreserved set. No general-purpose
/// percent-encoding crate is part of this stack; this is the whole
/// algorithm, not a stand-in for one.
fn percent_encode(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => out.push(byte as char),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

struct PendingAuthorization {
    idp_id: String,
    code_challenge: Option<String>,
}

pub struct FederationManager {
    idps: Arc<DashMap<String, IdentityProvider>>,
    sps: Arc<DashMap<String, ServiceProvider>>,
    sso_configs: Arc<DashMap<String, SsoConfig>>,
    federated_identities: Arc<DashMap<String, String>>,
    pending_authorizations: Arc<DashMap<String, PendingAuthorization>>,
    identities: Arc<IdentityStore>,
    tokens: Arc<TokenService>,
    clock: Arc<dyn Clock>,
    pub listeners: ListenerRegistry,
}

impl FederationManager {
    pub fn new(identities: Arc<IdentityStore>, tokens: Arc<TokenService>, clock: Arc<dyn Clock>) -> Self {
        Self {
            idps: Arc::new(DashMap::new()),
            sps: Arc::new(DashMap::new()),
            sso_configs: Arc::new(DashMap::new()),
            federated_identities: Arc::new(DashMap::new()),
            pending_authorizations: Arc::new(DashMap::new()),
            identities,
            tokens,
            clock,
            listeners: ListenerRegistry::new(),
        }
    }

    fn emit(&self, name: &str, idp_id: &str) {
        let mut payload = BTreeMap::new();
        payload.insert("identityProviderId".to_string(), idp_id.to_string().into());
        self.listeners.dispatch(&IamEvent::new(name, payload, self.clock.now()));
    }

    pub fn register_idp(&self, idp: IdentityProvider) -> IdentityProvider {
        self.idps.insert(idp.id.clone(), idp.clone());
        idp
    }

    pub fn get_idp(&self, id: &str) -> IamResult<IdentityProvider> {
        self.idps.get(id).map(|e| e.value().clone()).ok_or_else(|| IamError::not_found("IdentityProvider", id))
    }

    pub fn list_idps(&self) -> Vec<IdentityProvider> {
        self.idps.iter().map(|e| e.value().clone()).collect()
    }

    pub fn register_sp(&self, sp: ServiceProvider) -> ServiceProvider {
        self.sps.insert(sp.id.clone(), sp.clone());
        sp
    }

    pub fn get_sp(&self, id: &str) -> IamResult<ServiceProvider> {
        self.sps.get(id).map(|e| e.value().clone()).ok_or_else(|| IamError::not_found("ServiceProvider", id))
    }

    pub fn register_sso_config(&self, config: SsoConfig) -> SsoConfig {
        self.sso_configs.insert(config.id.clone(), config.clone());
        config
    }

    pub fn get_sso_config(&self, id: &str) -> IamResult<SsoConfig> {
        self.sso_configs.get(id).map(|e| e.value().clone()).ok_or_else(|| IamError::not_found("SsoConfig", id))
    }

    /// JIT-provision or resolve an existing identity from a composite
    /// `idpId:externalId` key. Only `username` is seeded on first login;
    /// richer attribute sync is the Directory Service's job, not this one's.
    fn provision_or_get(&self, idp: &IdentityProvider, external_id: &str) -> IamResult<Identity> {
        let key = format!("{}:{}", idp.id, external_id);
        if let Some(identity_id) = self.federated_identities.get(&key).map(|e| e.value().clone()) {
            return self.identities.get_identity(&identity_id);
        }

        if !idp.jit_provisioning_enabled {
            return Err(IamError::not_found("Identity", external_id));
        }

        let identity = self.identities.create_identity(new_id(), IdentityType::User, external_id);
        self.federated_identities.insert(key, identity.id.clone());
        self.emit("provisionedViaFederation", &idp.id);
        Ok(identity)
    }

    /// First non-empty of `sub`, `nameId`, `email`, `username` in the
    /// claims bag, in that priority order (spec §4.6).
    fn external_id_from_claims(claims: &BTreeMap<String, AttributeValue>) -> Option<String> {
        ["sub", "nameId", "email", "username"]
            .iter()
            .find_map(|key| claims.get(*key).and_then(AttributeValue::as_str).map(str::to_string))
    }

    pub fn generate_saml_request(&self, idp_id: &str, relay_state: Option<String>) -> IamResult<SamlRequest> {
        let idp = self.get_idp(idp_id)?;
        let ProtocolSettings::Saml(settings) = &idp.settings else {
            return Err(IamError::invalid_input("identityProviderId", "not a SAML provider"));
        };
        let request_id = new_id();
        let raw = format!(
            "<samlp:AuthnRequest ID=\"{request_id}\" Issuer=\"{}\" Destination=\"{}\"/>",
            settings.issuer, settings.sso_url
        );
        Ok(SamlRequest {
            request_id,
            saml_request: URL_SAFE_NO_PAD.encode(raw),
            relay_state: relay_state.unwrap_or_default(),
        })
    }

    pub fn generate_logout_request(&self, idp_id: &str) -> IamResult<SamlLogoutRequest> {
        let idp = self.get_idp(idp_id)?;
        let ProtocolSettings::Saml(settings) = &idp.settings else {
            return Err(IamError::invalid_input("identityProviderId", "not a SAML provider"));
        };
        let request_id = new_id();
        let raw = format!("<samlp:LogoutRequest ID=\"{request_id}\" Issuer=\"{}\"/>", settings.issuer);
        Ok(SamlLogoutRequest {
            request_id,
            logout_request: URL_SAFE_NO_PAD.encode(raw),
        })
    }

    /// Apply `attribute_mapping` literally: a raw attribute renamed to its
    /// mapped target passes through unchanged otherwise (spec §9 — no
    /// normalization, no dropped fields).
    pub fn process_saml_response(&self, idp_id: &str, name_id: &str, raw_attributes: BTreeMap<String, AttributeValue>, session_index: impl Into<String>) -> IamResult<SamlResponse> {
        let idp = self.get_idp(idp_id)?;
        let mut mapped = BTreeMap::new();
        for (key, value) in raw_attributes {
            let target = idp.attribute_mapping.get(&key).cloned().unwrap_or(key);
            mapped.insert(target, value);
        }

        let identity = self.provision_or_get(&idp, name_id)?;
        Ok(SamlResponse {
            identity_id: identity.id,
            attributes: mapped,
            session_index: session_index.into(),
        })
    }

    pub fn generate_authorization_url(&self, idp_id: &str) -> IamResult<OidcAuthorizationRequest> {
        let idp = self.get_idp(idp_id)?;
        let ProtocolSettings::Oidc(settings) = &idp.settings else {
            return Err(IamError::invalid_input("identityProviderId", "not an OIDC provider"));
        };

        let state = new_id();
        let nonce = new_id();
        let code_verifier = idp.requires_pkce().then(|| random_url_safe_token(32));
        let code_challenge = code_verifier.as_deref().map(pkce_s256_challenge);

        let mut url = format!(
            "{}?response_type=code&client_id={}&redirect_uri={}&state={}&nonce={}",
            settings.authorization_endpoint,
            percent_encode(&settings.client_id),
            percent_encode(&settings.redirect_uri),
            state,
            nonce,
        );
        if let Some(challenge) = &code_challenge {
            url.push_str(&format!("&code_challenge={}&code_challenge_method=S256", percent_encode(challenge)));
        }

        self.pending_authorizations.insert(
            state.clone(),
            PendingAuthorization {
                idp_id: idp.id.clone(),
                code_challenge,
            },
        );

        Ok(OidcAuthorizationRequest {
            url,
            state,
            nonce,
            code_verifier,
        })
    }

    /// `code` is the `state` value issued by `generate_authorization_url`;
    /// the real provider round-trip (authorization code for state) is out
    /// of scope without an HTTP client, so the state itself stands in for
    /// the code this manager already tracks a pending exchange for.
    pub fn exchange_authorization_code(&self, idp_id: &str, code: &str, code_verifier: Option<&str>) -> IamResult<OidcTokenResponse> {
        let idp = self.get_idp(idp_id)?;
        let (_, pending) = self
            .pending_authorizations
            .remove(code)
            .ok_or_else(|| IamError::not_found("OidcAuthorizationRequest", code))?;

        if pending.idp_id != idp.id {
            return Err(IamError::invalid_input("identityProviderId", "does not match pending authorization"));
        }
        if let Some(challenge) = &pending.code_challenge {
            let verifier = code_verifier.ok_or_else(|| IamError::invalid_input("codeVerifier", "required for PKCE exchange"))?;
            if &pkce_s256_challenge(verifier) != challenge {
                return Err(IamError::invalid_input("codeVerifier", "does not match code challenge"));
            }
        }

        let external_id = format!("oidc-{}", fingerprint(code));
        let mut claims = BTreeMap::new();
        claims.insert("sub".to_string(), AttributeValue::from(external_id.as_str()));
        let identity = self.provision_or_get(&idp, &external_id)?;

        let (access_token, _) = self.tokens.issue(IssueRequest::new(TokenType::Access, identity.id.clone()));
        let mut id_request = IssueRequest::new(TokenType::Id, identity.id.clone());
        id_request.claims = claims.clone();
        let (id_token, _) = self.tokens.issue(id_request);
        let (refresh_token, _) = self.tokens.issue(IssueRequest::new(TokenType::Refresh, identity.id));

        Ok(OidcTokenResponse {
            access_token: access_token.into_value(),
            id_token: id_token.into_value(),
            refresh_token: Some(refresh_token.into_value()),
            claims,
        })
    }
}

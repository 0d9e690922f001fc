use crate::core::value::AttributeValue;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SsoProtocol {
    Saml,
    Oidc,
}

#[derive(Debug, Clone, Default)]
pub struct SamlSettings {
    pub sso_url: String,
    pub slo_url: Option<String>,
    pub issuer: String,
    pub assertion_consumer_service_url: String,
}

#[derive(Debug, Clone, Default)]
pub struct OidcSettings {
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub requires_pkce: bool,
}

#[derive(Debug, Clone)]
pub enum ProtocolSettings {
    Saml(SamlSettings),
    Oidc(OidcSettings),
}

/// An identity provider registration (spec §4.6). `attribute_mapping` feeds
/// `processSAMLResponse`; `jit_provisioning_defaults` seed a newly minted
/// identity on first federated login.
#[derive(Debug, Clone)]
pub struct IdentityProvider {
    pub id: String,
    pub name: String,
    pub protocol: SsoProtocol,
    pub settings: ProtocolSettings,
    pub attribute_mapping: BTreeMap<String, String>,
    pub jit_provisioning_enabled: bool,
    pub jit_provisioning_defaults: BTreeMap<String, AttributeValue>,
    pub enabled: bool,
}

impl IdentityProvider {
    pub fn new(id: impl Into<String>, name: impl Into<String>, settings: ProtocolSettings) -> Self {
        let protocol = match &settings {
            ProtocolSettings::Saml(_) => SsoProtocol::Saml,
            ProtocolSettings::Oidc(_) => SsoProtocol::Oidc,
        };
        Self {
            id: id.into(),
            name: name.into(),
            protocol,
            settings,
            attribute_mapping: BTreeMap::new(),
            jit_provisioning_enabled: false,
            jit_provisioning_defaults: BTreeMap::new(),
            enabled: true,
        }
    }

    pub fn requires_pkce(&self) -> bool {
        matches!(&self.settings, ProtocolSettings::Oidc(o) if o.requires_pkce)
    }
}

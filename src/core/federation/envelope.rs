use crate::core::value::AttributeValue;
use std::collections::BTreeMap;

/// Return value of `generateSAMLRequest` (spec §6).
#[derive(Debug, Clone)]
pub struct SamlRequest {
    pub request_id: String,
    pub saml_request: String,
    pub relay_state: String,
}

/// Return value of `generateLogoutRequest`.
#[derive(Debug, Clone)]
pub struct SamlLogoutRequest {
    pub request_id: String,
    pub logout_request: String,
}

/// Return value of `processSAMLResponse` (spec §4.6).
#[derive(Debug, Clone)]
pub struct SamlResponse {
    pub identity_id: String,
    pub attributes: BTreeMap<String, AttributeValue>,
    pub session_index: String,
}

/// Return value of `generateAuthorizationUrl` (spec §6).
#[derive(Debug, Clone)]
pub struct OidcAuthorizationRequest {
    pub url: String,
    pub state: String,
    pub nonce: String,
    pub code_verifier: Option<String>,
}

/// Return value of `exchangeAuthorizationCode`.
#[derive(Debug, Clone)]
pub struct OidcTokenResponse {
    pub access_token: String,
    pub id_token: String,
    pub refresh_token: Option<String>,
    pub claims: BTreeMap<String, AttributeValue>,
}

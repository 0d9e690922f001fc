mod envelope;
mod idp;
mod sp;
mod sso_config;

pub use envelope::{
    OidcAuthorizationRequest, OidcTokenResponse, SamlLogoutRequest, SamlRequest, SamlResponse,
};
pub use idp::{IdentityProvider, OidcSettings, ProtocolSettings, SamlSettings, SsoProtocol};
pub use sp::ServiceProvider;
pub use sso_config::SsoConfig;

/// Binds an identity provider to the service providers it may assert into.
#[derive(Debug, Clone)]
pub struct SsoConfig {
    pub id: String,
    pub idp_id: String,
    pub sp_ids: Vec<String>,
    pub default_relay_state: Option<String>,
}

impl SsoConfig {
    pub fn new(id: impl Into<String>, idp_id: impl Into<String>, sp_ids: Vec<String>) -> Self {
        Self {
            id: id.into(),
            idp_id: idp_id.into(),
            sp_ids,
            default_relay_state: None,
        }
    }
}

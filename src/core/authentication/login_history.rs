use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct LoginHistoryEntry {
    pub identity_id: String,
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    pub ip_address: Option<String>,
    pub method: String,
    pub failure_reason: Option<String>,
}

/// Whether an `AuthPolicy`'s conditions must all match (`And`) or any one
/// of them is sufficient (`Or`) for the policy to apply to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPolicyConditionMode {
    And,
    Or,
}

/// Conditions gating whether a policy applies to a given authentication
/// attempt. An empty list of a given kind is treated as "not restricted on
/// this dimension".
#[derive(Debug, Clone, Default)]
pub struct AuthPolicyConditions {
    pub ip_ranges: Vec<String>,
    pub geo_countries: Vec<String>,
    pub device_substrings: Vec<String>,
    pub applications: Vec<String>,
}

impl AuthPolicyConditions {
    /// Evaluate against a request's observed ip/country/device/application,
    /// combining per `mode`. A dimension with no configured values does not
    /// count toward `Or` nor reject under `And`.
    pub fn matches(
        &self,
        mode: AuthPolicyConditionMode,
        ip: Option<&str>,
        country: Option<&str>,
        device: Option<&str>,
        application: Option<&str>,
    ) -> bool {
        let checks: Vec<bool> = [
            (!self.ip_ranges.is_empty())
                .then(|| ip.map(|v| self.ip_ranges.iter().any(|p| v.starts_with(p.as_str()))))
                .flatten(),
            (!self.geo_countries.is_empty())
                .then(|| country.map(|v| self.geo_countries.iter().any(|c| c == v)))
                .flatten(),
            (!self.device_substrings.is_empty())
                .then(|| device.map(|v| self.device_substrings.iter().any(|d| v.contains(d.as_str()))))
                .flatten(),
            (!self.applications.is_empty())
                .then(|| application.map(|v| self.applications.iter().any(|a| a == v)))
                .flatten(),
        ]
        .into_iter()
        .flatten()
        .collect();

        if checks.is_empty() {
            return true;
        }

        match mode {
            AuthPolicyConditionMode::And => checks.iter().all(|c| *c),
            AuthPolicyConditionMode::Or => checks.iter().any(|c| *c),
        }
    }
}

/// An authentication policy: gates which MFA methods/risk thresholds apply
/// to a login attempt matching its conditions (spec §4.2).
#[derive(Debug, Clone)]
pub struct AuthPolicy {
    pub id: String,
    pub priority: i32,
    pub enabled: bool,
    pub condition_mode: AuthPolicyConditionMode,
    pub conditions: AuthPolicyConditions,
    pub allowed_methods: Vec<String>,
    pub mfa_required: bool,
    pub risk_threshold: u8,
    pub max_failed_attempts: u32,
    pub lockout_duration_minutes: i64,
}

impl AuthPolicy {
    pub fn new(id: impl Into<String>, priority: i32) -> Self {
        Self {
            id: id.into(),
            priority,
            enabled: true,
            condition_mode: AuthPolicyConditionMode::And,
            conditions: AuthPolicyConditions::default(),
            allowed_methods: vec!["password".to_string()],
            mfa_required: false,
            risk_threshold: 80,
            max_failed_attempts: 5,
            lockout_duration_minutes: 30,
        }
    }
}

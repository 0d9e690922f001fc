use crate::core::risk::RiskLevel;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreatIndicatorType {
    IpAddress,
    UserAgent,
}

/// A threat-intelligence indicator, contributing a `reputation`-category
/// risk factor when matched (spec §4.4).
#[derive(Debug, Clone)]
pub struct ThreatIntelIndicator {
    pub indicator_type: ThreatIndicatorType,
    pub value: String,
    pub severity: RiskLevel,
    pub source: String,
    pub threat_type: String,
    pub expires_at: DateTime<Utc>,
}

impl ThreatIntelIndicator {
    pub fn is_active(&self, reference: DateTime<Utc>) -> bool {
        reference < self.expires_at
    }

    /// Severity-mapped score per spec §4.4.
    pub fn severity_score(&self) -> f64 {
        match self.severity {
            RiskLevel::Minimal => 10.0,
            RiskLevel::Low => 25.0,
            RiskLevel::Medium => 50.0,
            RiskLevel::High => 75.0,
            RiskLevel::Critical => 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn indicator_is_inactive_once_past_expiry() {
        let now = Utc::now();
        let indicator = ThreatIntelIndicator {
            indicator_type: ThreatIndicatorType::IpAddress,
            value: "198.51.100.7".to_string(),
            severity: RiskLevel::High,
            source: "feed-a".to_string(),
            threat_type: "scanner".to_string(),
            expires_at: now + Duration::hours(1),
        };

        assert!(indicator.is_active(now));
        assert!(!indicator.is_active(now + Duration::hours(2)));
        assert_eq!(indicator.severity_score(), 75.0);
    }
}

use crate::core::risk::RiskCategory;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskLevel {
    Minimal,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Band boundaries from spec §4.4: 0-20 minimal, 21-40 low, 41-60
    /// medium, 61-80 high, 81-100 critical.
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=20 => Self::Minimal,
            21..=40 => Self::Low,
            41..=60 => Self::Medium,
            61..=80 => Self::High,
            _ => Self::Critical,
        }
    }

    pub fn recommendation(self) -> RiskRecommendation {
        match self {
            Self::Minimal => RiskRecommendation::Allow,
            Self::Low => RiskRecommendation::Monitor,
            Self::Medium => RiskRecommendation::StepUp,
            Self::High => RiskRecommendation::Challenge,
            Self::Critical => RiskRecommendation::Deny,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskRecommendation {
    Allow,
    Monitor,
    StepUp,
    Challenge,
    Deny,
}

/// One scoring rule's contribution to an assessment.
#[derive(Debug, Clone)]
pub struct RiskFactor {
    pub rule_id: String,
    pub category: RiskCategory,
    pub raw_score: f64,
    pub weighted_score: f64,
}

/// The outcome of a risk assessment (spec §3/§4.4).
#[derive(Debug, Clone)]
pub struct RiskAssessment {
    pub identity_id: String,
    pub session_id: Option<String>,
    pub overall_score: u8,
    pub level: RiskLevel,
    pub factors: Vec<RiskFactor>,
    pub triggers: Vec<String>,
    pub recommendation: RiskRecommendation,
    pub assessed_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl RiskAssessment {
    pub fn is_expired(&self, reference: DateTime<Utc>) -> bool {
        reference >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_bands_match_boundaries_exactly() {
        assert_eq!(RiskLevel::from_score(20), RiskLevel::Minimal);
        assert_eq!(RiskLevel::from_score(21), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(40), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(41), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(60), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(61), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(80), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(81), RiskLevel::Critical);
    }

    #[test]
    fn recommendation_mapping_matches_spec() {
        assert_eq!(RiskLevel::Minimal.recommendation(), RiskRecommendation::Allow);
        assert_eq!(RiskLevel::Critical.recommendation(), RiskRecommendation::Deny);
    }
}

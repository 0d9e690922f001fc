//! Risk Engine domain types: scoring rules, behavioral profiles, anomaly
//! detection results, threat intelligence indicators, and the resulting
//! assessment.

mod anomaly;
mod assessment;
mod category;
mod profile;
mod scoring_rule;
mod threat_intel;

pub use anomaly::{AnomalyDetectionResult, AnomalyType};
pub use assessment::{RiskAssessment, RiskFactor, RiskLevel, RiskRecommendation};
pub use category::RiskCategory;
pub use profile::{BehavioralProfile, GeoPoint};
pub use scoring_rule::{RuleCondition, RuleLogic, ScoringRule};
pub use threat_intel::{ThreatIndicatorType, ThreatIntelIndicator};

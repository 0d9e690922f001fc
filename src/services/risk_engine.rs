//! Risk Engine: weighted multi-factor scoring, behavioral-profile anomaly
//! detection, and threat-intelligence reputation lookups (spec §2
//! subsystem 9, §4.4).

use crate::core::authorization::ConditionOperator;
use crate::core::clock::Clock;
use crate::core::error::{IamError, IamResult};
use crate::core::risk::{
    AnomalyDetectionResult, AnomalyType, BehavioralProfile, GeoPoint, RiskAssessment, RiskCategory,
    RiskFactor, RiskLevel, RuleCondition, RuleLogic, ScoringRule, ThreatIndicatorType,
    ThreatIntelIndicator,
};
use crate::core::value::AttributeValue;
use crate::event::{IamEvent, ListenerRegistry};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;

const ASSESSMENT_TTL: Duration = Duration::minutes(5);
const VELOCITY_WINDOW: Duration = Duration::minutes(5);
const VELOCITY_THRESHOLD: usize = 10;

fn severity_score(level: RiskLevel) -> f64 {
    match level {
        RiskLevel::Minimal => 10.0,
        RiskLevel::Low => 25.0,
        RiskLevel::Medium => 50.0,
        RiskLevel::High => 75.0,
        RiskLevel::Critical => 100.0,
    }
}

fn evaluate_operator(operator: ConditionOperator, resolved: Option<&AttributeValue>, expected: &AttributeValue) -> bool {
    match operator {
        ConditionOperator::Exists => resolved.map(|v| !matches!(v, AttributeValue::Null)).unwrap_or(false),
        ConditionOperator::Equals => resolved.map(|v| v.to_loose_string() == expected.to_loose_string()).unwrap_or(false),
        ConditionOperator::NotEquals => resolved.map(|v| v.to_loose_string() != expected.to_loose_string()).unwrap_or(true),
        ConditionOperator::Contains => match resolved {
            Some(AttributeValue::List(items)) => items.iter().any(|i| i.to_loose_string() == expected.to_loose_string()),
            Some(AttributeValue::String(s)) => s.contains(&expected.to_loose_string()),
            _ => false,
        },
        ConditionOperator::In => match expected {
            AttributeValue::List(items) => resolved.map(|v| items.iter().any(|i| i.to_loose_string() == v.to_loose_string())).unwrap_or(false),
            _ => false,
        },
        ConditionOperator::GreaterThan => match (resolved.and_then(AttributeValue::as_number), expected.as_number()) {
            (Some(a), Some(b)) => a > b,
            _ => false,
        },
        ConditionOperator::LessThan => match (resolved.and_then(AttributeValue::as_number), expected.as_number()) {
            (Some(a), Some(b)) => a < b,
            _ => false,
        },
        ConditionOperator::Between => match (expected, resolved.and_then(AttributeValue::as_number)) {
            (AttributeValue::List(bounds), Some(actual)) if bounds.len() == 2 => {
                let (Some(low), Some(high)) = (bounds[0].as_number(), bounds[1].as_number()) else {
                    return false;
                };
                actual >= low && actual <= high
            }
            _ => false,
        },
        ConditionOperator::Matches => {
            let Some(resolved) = resolved else { return false };
            regex::Regex::new(&expected.to_loose_string()).map(|re| re.is_match(&resolved.to_loose_string())).unwrap_or(false)
        }
    }
}

fn evaluate_rule_condition(condition: &RuleCondition, context: &AttributeValue) -> bool {
    match condition {
        RuleCondition::Leaf { field, operator, value } => evaluate_operator(*operator, context.resolve_path(field), value),
        RuleCondition::Group { logic, children } => match logic {
            RuleLogic::And => children.iter().all(|c| evaluate_rule_condition(c, context)),
            RuleLogic::Or => children.iter().any(|c| evaluate_rule_condition(c, context)),
        },
    }
}

fn hour_distance(a: u32, b: u32) -> u32 {
    let diff = a.abs_diff(b);
    diff.min(24 - diff)
}

pub struct RiskAssessmentRequest {
    pub identity_id: String,
    pub session_id: Option<String>,
    pub hour: u32,
    pub location: Option<GeoPoint>,
    pub device_fingerprint: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub context: AttributeValue,
}

impl RiskAssessmentRequest {
    pub fn new(identity_id: impl Into<String>, hour: u32) -> Self {
        Self {
            identity_id: identity_id.into(),
            session_id: None,
            hour,
            location: None,
            device_fingerprint: None,
            ip_address: None,
            user_agent: None,
            context: AttributeValue::default(),
        }
    }
}

pub struct RiskEngine {
    rules: Arc<DashMap<String, ScoringRule>>,
    profiles: Arc<DashMap<String, BehavioralProfile>>,
    threat_indicators: Arc<DashMap<String, ThreatIntelIndicator>>,
    assessment_timestamps: Arc<DashMap<String, Vec<DateTime<Utc>>>>,
    last_level: Arc<DashMap<String, RiskLevel>>,
    clock: Arc<dyn Clock>,
    pub listeners: ListenerRegistry,
}

impl RiskEngine {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            rules: Arc::new(DashMap::new()),
            profiles: Arc::new(DashMap::new()),
            threat_indicators: Arc::new(DashMap::new()),
            assessment_timestamps: Arc::new(DashMap::new()),
            last_level: Arc::new(DashMap::new()),
            clock,
            listeners: ListenerRegistry::new(),
        }
    }

    fn emit(&self, name: &str, identity_id: &str) {
        let mut payload = BTreeMap::new();
        payload.insert("identityId".to_string(), identity_id.to_string().into());
        self.listeners.dispatch(&IamEvent::new(name, payload, self.clock.now()));
    }

    pub fn register_rule(&self, rule: ScoringRule) -> ScoringRule {
        self.rules.insert(rule.id.clone(), rule.clone());
        rule
    }

    pub fn register_threat_indicator(&self, indicator: ThreatIntelIndicator) {
        self.threat_indicators.insert(indicator.value.clone(), indicator);
    }

    pub fn get_profile(&self, identity_id: &str) -> IamResult<BehavioralProfile> {
        self.profiles.get(identity_id).map(|e| e.value().clone()).ok_or_else(|| IamError::not_found("BehavioralProfile", identity_id))
    }

    fn scoring_factors(&self, request: &RiskAssessmentRequest) -> Vec<RiskFactor> {
        let mut rules: Vec<ScoringRule> = self.rules.iter().filter(|e| e.enabled).map(|e| e.value().clone()).collect();
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));

        rules
            .into_iter()
            .filter(|rule| evaluate_rule_condition(&rule.condition, &request.context))
            .map(|rule| {
                let raw = rule.score_adjustment.clamp(0.0, 100.0);
                RiskFactor {
                    rule_id: rule.id,
                    category: rule.category,
                    raw_score: raw,
                    weighted_score: raw * rule.category.weight(),
                }
            })
            .collect()
    }

    fn anomaly_checks(&self, profile: &BehavioralProfile, request: &RiskAssessmentRequest, now: DateTime<Utc>) -> Vec<AnomalyDetectionResult> {
        let mut anomalies = Vec::new();

        if let Some(location) = request.location {
            if let Some(reference) = profile.most_recent_location() {
                let distance = reference.haversine_km(&location);
                let elapsed_hours = (now - profile.last_updated_at).num_seconds() as f64 / 3600.0;
                let max_plausible = elapsed_hours * 900.0;
                if distance > 500.0 && distance > max_plausible {
                    let confidence = (distance / (max_plausible + 1.0)).min(1.0);
                    anomalies.push(AnomalyDetectionResult::new(
                        AnomalyType::ImpossibleTravel,
                        RiskLevel::High,
                        confidence,
                        format!("{distance:.1}km since last profile update exceeds plausible {max_plausible:.1}km"),
                    ));
                }
            }

            if !profile.typical_locations.is_empty() {
                let min_distance = profile
                    .typical_locations
                    .iter()
                    .map(|l| l.haversine_km(&location))
                    .fold(f64::MAX, f64::min);
                if min_distance > 200.0 {
                    let severity = if min_distance > 1000.0 { RiskLevel::High } else { RiskLevel::Medium };
                    let confidence = (min_distance / 2000.0).min(1.0);
                    anomalies.push(AnomalyDetectionResult::new(
                        AnomalyType::UnusualLocation,
                        severity,
                        confidence,
                        format!("{min_distance:.1}km from nearest typical location"),
                    ));
                }
            }
        }

        if profile.data_point_count >= 3 && !profile.typical_hours.iter().any(|h| hour_distance(*h, request.hour) <= 1) {
            anomalies.push(AnomalyDetectionResult::new(
                AnomalyType::UnusualTime,
                RiskLevel::Low,
                0.7,
                format!("hour {} is outside typical hours", request.hour),
            ));
        }

        if !profile.known_devices.is_empty() {
            if let Some(fp) = &request.device_fingerprint {
                if !profile.known_devices.contains(fp) {
                    anomalies.push(AnomalyDetectionResult::new(AnomalyType::NewDevice, RiskLevel::Medium, 0.85, "fingerprint not in known device set"));
                }
            }
        }

        let recent_count = self
            .assessment_timestamps
            .get(&request.identity_id)
            .map(|timestamps| timestamps.iter().filter(|t| now - **t < VELOCITY_WINDOW).count())
            .unwrap_or(0);
        if recent_count > VELOCITY_THRESHOLD {
            anomalies.push(AnomalyDetectionResult::new(
                AnomalyType::VelocityAnomaly,
                RiskLevel::High,
                1.0,
                format!("{recent_count} assessments in the last 5 minutes"),
            ));
        }

        anomalies
    }

    fn reputation_factor(&self, request: &RiskAssessmentRequest, now: DateTime<Utc>) -> Option<RiskFactor> {
        let candidates = [
            (ThreatIndicatorType::IpAddress, request.ip_address.as_deref()),
            (ThreatIndicatorType::UserAgent, request.user_agent.as_deref()),
        ];
        for (kind, value) in candidates {
            let Some(value) = value else { continue };
            if let Some(indicator) = self.threat_indicators.get(value) {
                if indicator.indicator_type == kind && indicator.is_active(now) {
                    let raw = indicator.severity_score();
                    return Some(RiskFactor {
                        rule_id: format!("threat-intel:{value}"),
                        category: RiskCategory::Reputation,
                        raw_score: raw,
                        weighted_score: raw * RiskCategory::Reputation.weight(),
                    });
                }
            }
        }
        None
    }

    /// Factor-by-factor scoring, anomaly detection, threat-intel lookup,
    /// aggregation, and incremental profile update (spec §4.4).
    pub fn assess(&self, request: RiskAssessmentRequest) -> RiskAssessment {
        let now = self.clock.now();
        let mut factors = self.scoring_factors(&request);

        let profile_before = self
            .profiles
            .get(&request.identity_id)
            .map(|e| e.value().clone())
            .unwrap_or_else(|| BehavioralProfile::new(request.identity_id.clone(), now));

        let anomalies = self.anomaly_checks(&profile_before, &request, now);
        let mut triggers: Vec<String> = Vec::new();
        for anomaly in &anomalies {
            triggers.push(anomaly.anomaly_type.to_string());
            let category = match anomaly.anomaly_type {
                AnomalyType::ImpossibleTravel | AnomalyType::UnusualLocation => RiskCategory::Location,
                AnomalyType::UnusualTime => RiskCategory::Time,
                AnomalyType::NewDevice => RiskCategory::Device,
                AnomalyType::VelocityAnomaly => RiskCategory::Velocity,
            };
            let raw = severity_score(anomaly.severity) * anomaly.confidence;
            factors.push(RiskFactor {
                rule_id: format!("anomaly:{}", anomaly.anomaly_type),
                category,
                raw_score: raw,
                weighted_score: raw * category.weight(),
            });
        }

        if let Some(reputation) = self.reputation_factor(&request, now) {
            triggers.push("threat-intel".to_string());
            factors.push(reputation);
        }

        let overall_score = if factors.is_empty() {
            0
        } else {
            let weighted_sum: f64 = factors.iter().map(|f| f.weighted_score).sum();
            let weight_sum: f64 = factors.iter().map(|f| f.category.weight()).sum();
            (weighted_sum / weight_sum).round().clamp(0.0, 100.0) as u8
        };
        let level = RiskLevel::from_score(overall_score);

        let assessment = RiskAssessment {
            identity_id: request.identity_id.clone(),
            session_id: request.session_id.clone(),
            overall_score,
            level,
            factors,
            triggers,
            recommendation: level.recommendation(),
            assessed_at: now,
            expires_at: now + ASSESSMENT_TTL,
        };

        self.assessment_timestamps.entry(request.identity_id.clone()).or_default().push(now);

        let mut profile = profile_before;
        profile.absorb(
            request.hour,
            request.location,
            request.device_fingerprint.as_deref(),
            request.ip_address.as_deref(),
            0.0,
            0.0,
            now,
        );
        self.profiles.insert(request.identity_id.clone(), profile);

        self.emit("riskAssessed", &request.identity_id);
        let previous_level = self.last_level.insert(request.identity_id.clone(), level);
        if previous_level != Some(level) {
            self.emit("riskLevelChanged", &request.identity_id);
        }

        assessment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::FixedClock;
    use crate::core::risk::RuleCondition;

    fn engine() -> RiskEngine {
        RiskEngine::new(Arc::new(FixedClock::new(Utc::now())))
    }

    #[test]
    fn no_factors_yields_minimal_score() {
        let engine = engine();
        let assessment = engine.assess(RiskAssessmentRequest::new("u1", 9));
        assert_eq!(assessment.overall_score, 0);
        assert_eq!(assessment.level, RiskLevel::Minimal);
    }

    #[test]
    fn impossible_travel_between_far_apart_points_is_flagged_high() {
        let engine = engine();
        let clock = Arc::new(FixedClock::new(Utc::now()));
        let engine = RiskEngine::new(clock.clone());

        let mut first = RiskAssessmentRequest::new("u1", 9);
        first.location = Some(GeoPoint::new(40.7, -74.0));
        engine.assess(first);

        clock.advance(Duration::minutes(30));

        let mut second = RiskAssessmentRequest::new("u1", 9);
        second.location = Some(GeoPoint::new(35.7, 139.7));
        let assessment = engine.assess(second);

        assert!(assessment.triggers.contains(&"impossible-travel".to_string()));
        assert!(assessment.level >= RiskLevel::High);
    }

    #[test]
    fn matching_scoring_rule_contributes_to_overall_score() {
        let engine = engine();
        engine.register_rule(ScoringRule::new(
            "r1",
            "suspicious-country",
            RiskCategory::Location,
            10,
            RuleCondition::leaf("country", ConditionOperator::Equals, AttributeValue::from("XX")),
            60.0,
        ));

        let mut request = RiskAssessmentRequest::new("u1", 9);
        request.context = AttributeValue::map().set("country", "XX").build();
        let assessment = engine.assess(request);
        assert!(assessment.overall_score > 0);
    }

    #[test]
    fn active_threat_indicator_contributes_reputation_factor() {
        let engine = engine();
        engine.register_threat_indicator(ThreatIntelIndicator {
            indicator_type: ThreatIndicatorType::IpAddress,
            value: "1.2.3.4".to_string(),
            severity: RiskLevel::High,
            source: "test-feed".to_string(),
            threat_type: "botnet".to_string(),
            expires_at: Utc::now() + Duration::days(1),
        });

        let mut request = RiskAssessmentRequest::new("u1", 9);
        request.ip_address = Some("1.2.3.4".to_string());
        let assessment = engine.assess(request);
        assert!(assessment.triggers.contains(&"threat-intel".to_string()));
    }
}

use crate::core::risk::RiskLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnomalyType {
    ImpossibleTravel,
    UnusualTime,
    NewDevice,
    UnusualLocation,
    VelocityAnomaly,
}

impl std::fmt::Display for AnomalyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::ImpossibleTravel => "impossible-travel",
            Self::UnusualTime => "unusual-time",
            Self::NewDevice => "new-device",
            Self::UnusualLocation => "unusual-location",
            Self::VelocityAnomaly => "velocity-anomaly",
        };
        f.write_str(label)
    }
}

/// One detected anomaly, produced by the Risk Engine's behavioral checks
/// (spec §4.4).
#[derive(Debug, Clone)]
pub struct AnomalyDetectionResult {
    pub anomaly_type: AnomalyType,
    pub severity: RiskLevel,
    pub confidence: f64,
    pub detail: String,
}

impl AnomalyDetectionResult {
    pub fn new(anomaly_type: AnomalyType, severity: RiskLevel, confidence: f64, detail: impl Into<String>) -> Self {
        Self {
            anomaly_type,
            severity,
            confidence: confidence.clamp(0.0, 1.0),
            detail: detail.into(),
        }
    }
}

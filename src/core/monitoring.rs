//! Monitoring domain types: named counters and threshold-based alert rules
//! (spec §2 subsystem 13).

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

/// Fires when `counter_name`'s value is `>= threshold`.
#[derive(Debug, Clone)]
pub struct AlertRule {
    pub id: String,
    pub name: String,
    pub counter_name: String,
    pub threshold: u64,
    pub severity: AlertSeverity,
}

impl AlertRule {
    pub fn new(id: impl Into<String>, name: impl Into<String>, counter_name: impl Into<String>, threshold: u64, severity: AlertSeverity) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            counter_name: counter_name.into(),
            threshold,
            severity,
        }
    }

    pub fn is_triggered(&self, counter_value: u64) -> bool {
        counter_value >= self.threshold
    }
}

/// A fired alert, the rule's state at the moment a counter crossed its
/// threshold.
#[derive(Debug, Clone)]
pub struct TriggeredAlert {
    pub rule_id: String,
    pub name: String,
    pub severity: AlertSeverity,
    pub counter_value: u64,
    pub triggered_at: DateTime<Utc>,
}

/// A point-in-time snapshot of every named counter, plus process uptime
/// (spec §4.8 `getMetrics`). `gauges` carries point-in-time subsystem sizes
/// (e.g. live identity count) as opposed to `counters`' monotonic totals;
/// the orchestrator populates it, since only it can see every subsystem.
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub counters: BTreeMap<String, u64>,
    pub gauges: BTreeMap<String, u64>,
    pub uptime_seconds: i64,
    pub started_at: DateTime<Utc>,
    pub snapshot_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_triggers_once_counter_reaches_threshold() {
        let rule = AlertRule::new("r1", "too many failed logins", "authFailed", 5, AlertSeverity::Warning);
        assert!(!rule.is_triggered(4));
        assert!(rule.is_triggered(5));
        assert!(rule.is_triggered(6));
    }
}

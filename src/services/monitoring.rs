//! Monitoring: named counters fed by every other subsystem's event stream,
//! plus threshold alert rules (spec §2 subsystem 13, §4.8).

use crate::core::clock::Clock;
use crate::core::monitoring::{AlertRule, MetricsSnapshot, TriggeredAlert};
use crate::event::{IamEvent, ListenerRegistry};
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

pub struct Monitoring {
    counters: Arc<DashMap<String, u64>>,
    alert_rules: RwLock<Vec<AlertRule>>,
    clock: Arc<dyn Clock>,
    started_at: chrono::DateTime<chrono::Utc>,
    shut_down: AtomicBool,
    pub listeners: ListenerRegistry,
}

impl Monitoring {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let started_at = clock.now();
        Self {
            counters: Arc::new(DashMap::new()),
            alert_rules: RwLock::new(Vec::new()),
            clock,
            started_at,
            shut_down: AtomicBool::new(false),
            listeners: ListenerRegistry::new(),
        }
    }

    pub fn register_alert_rule(&self, rule: AlertRule) {
        self.alert_rules.write().expect("alert rule lock poisoned").push(rule);
    }

    /// Increment a named counter and check every alert rule attached to it,
    /// firing `alertTriggered` for any that cross their threshold.
    pub fn increment(&self, counter_name: &str) -> u64 {
        let mut value = self.counters.entry(counter_name.to_string()).or_insert(0);
        *value += 1;
        let updated = *value;
        drop(value);

        let rules = self.alert_rules.read().expect("alert rule lock poisoned");
        for rule in rules.iter().filter(|r| r.counter_name == counter_name) {
            if rule.is_triggered(updated) {
                let alert = TriggeredAlert {
                    rule_id: rule.id.clone(),
                    name: rule.name.clone(),
                    severity: rule.severity,
                    counter_value: updated,
                    triggered_at: self.clock.now(),
                };
                self.emit_alert(&alert);
            }
        }
        updated
    }

    fn emit_alert(&self, alert: &TriggeredAlert) {
        let mut payload = BTreeMap::new();
        payload.insert("ruleId".to_string(), alert.rule_id.clone().into());
        payload.insert("counterValue".to_string(), (alert.counter_value as f64).into());
        self.listeners.dispatch(&IamEvent::new("alertTriggered", payload, alert.triggered_at));
    }

    pub fn get_counter(&self, counter_name: &str) -> u64 {
        self.counters.get(counter_name).map(|e| *e.value()).unwrap_or(0)
    }

    pub fn get_metrics(&self) -> MetricsSnapshot {
        let counters: BTreeMap<String, u64> = self.counters.iter().map(|e| (e.key().clone(), *e.value())).collect();
        let now = self.clock.now();
        MetricsSnapshot {
            counters,
            gauges: BTreeMap::new(),
            uptime_seconds: (now - self.started_at).num_seconds(),
            started_at: self.started_at,
            snapshot_at: now,
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::SeqCst)
    }

    pub fn shutdown(&self) {
        self.shut_down.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::FixedClock;
    use crate::core::monitoring::AlertSeverity;
    use chrono::{Duration, Utc};

    #[test]
    fn increment_accumulates_per_counter_name() {
        let monitoring = Monitoring::new(Arc::new(FixedClock::new(Utc::now())));
        monitoring.increment("loginSucceeded");
        monitoring.increment("loginSucceeded");
        monitoring.increment("loginFailed");

        assert_eq!(monitoring.get_counter("loginSucceeded"), 2);
        assert_eq!(monitoring.get_counter("loginFailed"), 1);
    }

    #[test]
    fn alert_fires_once_threshold_crossed() {
        let monitoring = Monitoring::new(Arc::new(FixedClock::new(Utc::now())));
        monitoring.register_alert_rule(AlertRule::new("r1", "failed login spike", "loginFailed", 3, AlertSeverity::Warning));

        let fired = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let fired_clone = fired.clone();
        monitoring.listeners.register(Box::new(move |event| {
            if event.name == "alertTriggered" {
                fired_clone.fetch_add(1, Ordering::SeqCst);
            }
            Ok(())
        }));

        monitoring.increment("loginFailed");
        monitoring.increment("loginFailed");
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        monitoring.increment("loginFailed");
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn metrics_snapshot_reports_uptime() {
        let clock = Arc::new(FixedClock::new(Utc::now()));
        let monitoring = Monitoring::new(clock.clone());
        clock.advance(Duration::minutes(5));
        let snapshot = monitoring.get_metrics();
        assert_eq!(snapshot.uptime_seconds, 300);
    }
}

use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// An append-only audit record. `id` and `timestamp` are assigned by the
/// logger, never by the caller.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub actor_id: String,
    pub success: bool,
    pub detail: Option<String>,
}

/// AND-composed filter over `action`, `actor`, `success`, and a time range.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub action: Option<String>,
    pub actor: Option<String>,
    pub success: Option<bool>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

impl AuditFilter {
    fn matches(&self, entry: &AuditEntry) -> bool {
        if let Some(action) = &self.action {
            if &entry.action != action {
                return false;
            }
        }
        if let Some(actor) = &self.actor {
            if &entry.actor_id != actor {
                return false;
            }
        }
        if let Some(success) = self.success {
            if entry.success != success {
                return false;
            }
        }
        if let Some(start) = self.start_time {
            if entry.timestamp < start {
                return false;
            }
        }
        if let Some(end) = self.end_time {
            if entry.timestamp > end {
                return false;
            }
        }
        true
    }
}

/// A ring buffer of audit entries, bounded at `max_entries` (default 10 000,
/// FIFO trim of the oldest — spec §3/§4.7).
#[derive(Debug, Clone)]
pub struct AuditLogBuffer {
    entries: VecDeque<AuditEntry>,
    max_entries: usize,
}

impl AuditLogBuffer {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries,
        }
    }

    pub fn append(&mut self, entry: AuditEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn query(&self, filter: &AuditFilter) -> Vec<AuditEntry> {
        let matched = self.entries.iter().filter(|entry| filter.matches(entry)).cloned();
        match filter.limit {
            Some(limit) => matched.take(limit).collect(),
            None => matched.collect(),
        }
    }
}

impl Default for AuditLogBuffer {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, action: &str, success: bool, now: DateTime<Utc>) -> AuditEntry {
        AuditEntry {
            id: id.to_string(),
            timestamp: now,
            action: action.to_string(),
            actor_id: "u1".to_string(),
            success,
            detail: None,
        }
    }

    #[test]
    fn trims_oldest_entries_once_over_capacity() {
        let now = Utc::now();
        let mut buffer = AuditLogBuffer::new(3);
        for i in 0..5 {
            buffer.append(entry(&format!("e{i}"), "login", true, now));
        }
        assert_eq!(buffer.len(), 3);
        let remaining = buffer.query(&AuditFilter::default());
        assert_eq!(remaining[0].id, "e2");
        assert_eq!(remaining[2].id, "e4");
    }

    #[test]
    fn filter_composes_with_and() {
        let now = Utc::now();
        let mut buffer = AuditLogBuffer::new(10);
        buffer.append(entry("e1", "login", true, now));
        buffer.append(entry("e2", "login", false, now));
        buffer.append(entry("e3", "logout", true, now));

        let filter = AuditFilter {
            action: Some("login".to_string()),
            success: Some(true),
            ..Default::default()
        };
        let results = buffer.query(&filter);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "e1");
    }
}

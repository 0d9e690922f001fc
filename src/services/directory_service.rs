//! Directory Service: an LDAP-like entry store with attribute search
//! (spec §2 subsystem 3).

use crate::core::clock::Clock;
use crate::core::directory::DirectoryEntry;
use crate::core::error::{IamError, IamResult};
use crate::event::{IamEvent, ListenerRegistry};
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct DirectoryService {
    entries: Arc<DashMap<String, DirectoryEntry>>,
    clock: Arc<dyn Clock>,
    pub listeners: ListenerRegistry,
}

impl DirectoryService {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            clock,
            listeners: ListenerRegistry::new(),
        }
    }

    fn emit(&self, name: &str, dn: &str) {
        let mut payload = BTreeMap::new();
        payload.insert("dn".to_string(), dn.to_string().into());
        self.listeners.dispatch(&IamEvent::new(name, payload, self.clock.now()));
    }

    pub fn upsert(&self, entry: DirectoryEntry) -> DirectoryEntry {
        self.entries.insert(entry.dn.clone(), entry.clone());
        self.emit("directoryEntryUpserted", &entry.dn);
        entry
    }

    pub fn get(&self, dn: &str) -> IamResult<DirectoryEntry> {
        self.entries.get(dn).map(|e| e.value().clone()).ok_or_else(|| IamError::not_found("DirectoryEntry", dn))
    }

    pub fn remove(&self, dn: &str) -> IamResult<()> {
        self.entries.remove(dn).map(|_| ()).ok_or_else(|| IamError::not_found("DirectoryEntry", dn))?;
        self.emit("directoryEntryRemoved", dn);
        Ok(())
    }

    /// Search every entry for a case-insensitive substring match on
    /// `attribute`, in deterministic insertion order (spec §4.7).
    pub fn search(&self, attribute: &str, needle: &str) -> Vec<DirectoryEntry> {
        let mut matches: Vec<_> = self
            .entries
            .iter()
            .filter(|e| e.value().matches_attribute(attribute, needle))
            .map(|e| e.value().clone())
            .collect();
        matches.sort_by(|a, b| a.dn.cmp(&b.dn));
        matches
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::FixedClock;
    use chrono::Utc;

    fn service() -> DirectoryService {
        DirectoryService::new(Arc::new(FixedClock::new(Utc::now())))
    }

    #[test]
    fn search_matches_case_insensitive_substring() {
        let service = service();
        service.upsert(DirectoryEntry::new("cn=alice,dc=example", vec!["person".to_string()]).with_attribute("mail", vec!["alice@example.com".to_string()]));
        service.upsert(DirectoryEntry::new("cn=bob,dc=example", vec!["person".to_string()]).with_attribute("mail", vec!["bob@example.com".to_string()]));

        let results = service.search("mail", "ALICE");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].dn, "cn=alice,dc=example");
    }
}

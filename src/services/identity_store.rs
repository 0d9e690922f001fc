//! Identity Store: CRUD and status lifecycle for identities, organizations,
//! and groups (spec §2 subsystem 1).

use crate::core::clock::Clock;
use crate::core::error::{IamError, IamResult};
use crate::core::identity::{Group, Identity, IdentityStatus, IdentityType, Organization};
use crate::event::{IamEvent, ListenerRegistry};
use chrono::Utc;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct IdentityStore {
    identities: Arc<DashMap<String, Identity>>,
    organizations: Arc<DashMap<String, Organization>>,
    groups: Arc<DashMap<String, Group>>,
    clock: Arc<dyn Clock>,
    pub listeners: ListenerRegistry,
}

impl IdentityStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            identities: Arc::new(DashMap::new()),
            organizations: Arc::new(DashMap::new()),
            groups: Arc::new(DashMap::new()),
            clock,
            listeners: ListenerRegistry::new(),
        }
    }

    fn emit(&self, name: &str, payload: BTreeMap<String, crate::core::value::AttributeValue>) {
        self.listeners.dispatch(&IamEvent::new(name, payload, self.clock.now()));
    }

    pub fn create_identity(&self, id: impl Into<String>, identity_type: IdentityType, username: impl Into<String>) -> Identity {
        let now = self.clock.now();
        let identity = Identity::new(id, identity_type, username, now);
        self.identities.insert(identity.id.clone(), identity.clone());
        let mut payload = BTreeMap::new();
        payload.insert("identityId".to_string(), identity.id.clone().into());
        self.emit("identityCreated", payload);
        identity
    }

    pub fn get_identity(&self, id: &str) -> IamResult<Identity> {
        self.identities
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| IamError::not_found("Identity", id))
    }

    pub fn find_by_username_or_email(&self, login: &str) -> Option<Identity> {
        self.identities
            .iter()
            .find(|entry| entry.value().username == login || entry.value().email.as_deref() == Some(login))
            .map(|entry| entry.value().clone())
    }

    pub fn set_status(&self, id: &str, status: IdentityStatus) -> IamResult<Identity> {
        let mut entry = self.identities.get_mut(id).ok_or_else(|| IamError::not_found("Identity", id))?;
        entry.status = status;
        entry.updated_at = self.clock.now();
        let updated = entry.value().clone();
        drop(entry);
        let mut payload = BTreeMap::new();
        payload.insert("identityId".to_string(), id.to_string().into());
        self.emit("identityStatusChanged", payload);
        Ok(updated)
    }

    pub fn list_identities(&self) -> Vec<Identity> {
        self.identities.iter().map(|e| e.value().clone()).collect()
    }

    pub fn create_organization(&self, organization: Organization) -> Organization {
        self.organizations.insert(organization.id.clone(), organization.clone());
        organization
    }

    pub fn get_organization(&self, id: &str) -> IamResult<Organization> {
        self.organizations.get(id).map(|e| e.value().clone()).ok_or_else(|| IamError::not_found("Organization", id))
    }

    pub fn create_group(&self, group: Group) -> Group {
        self.groups.insert(group.id.clone(), group.clone());
        group
    }

    pub fn get_group(&self, id: &str) -> IamResult<Group> {
        self.groups.get(id).map(|e| e.value().clone()).ok_or_else(|| IamError::not_found("Group", id))
    }

    pub fn add_member(&self, group_id: &str, identity_id: &str) -> IamResult<Group> {
        let mut group = self.groups.get_mut(group_id).ok_or_else(|| IamError::not_found("Group", group_id))?;
        group.member_ids.insert(identity_id.to_string());
        Ok(group.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::FixedClock;

    fn store() -> IdentityStore {
        IdentityStore::new(Arc::new(FixedClock::new(Utc::now())))
    }

    #[test]
    fn create_then_get_round_trips() {
        let store = store();
        store.create_identity("u1", IdentityType::User, "alice");
        let identity = store.get_identity("u1").unwrap();
        assert_eq!(identity.username, "alice");
    }

    #[test]
    fn get_missing_identity_is_not_found() {
        let store = store();
        assert!(store.get_identity("missing").unwrap_err().is_not_found());
    }

    #[test]
    fn find_by_username_or_email_matches_either() {
        let store = store();
        let mut identity = store.create_identity("u1", IdentityType::User, "alice");
        identity.email = Some("alice@example.com".to_string());
        store.identities.insert(identity.id.clone(), identity);
        assert!(store.find_by_username_or_email("alice@example.com").is_some());
        assert!(store.find_by_username_or_email("alice").is_some());
        assert!(store.find_by_username_or_email("bob").is_none());
    }
}

//! Privileged Access Manager: vaulted credentials, just-in-time checkout
//! with approval gating, and session recording (spec §2 subsystem 7, §4.7).

use crate::adapters::crypto::nonce::new_id;
use crate::adapters::crypto::password_hash::PasswordHasher;
use crate::core::clock::Clock;
use crate::core::credentials::StoredCredential;
use crate::core::error::{IamError, IamResult};
use crate::core::pam::{Checkout, CheckoutStatus, CredentialVault, PrivilegedAccount, SessionRecording};
use crate::event::{IamEvent, ListenerRegistry};
use chrono::Duration;
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct PrivilegedAccessManager {
    accounts: Arc<DashMap<String, PrivilegedAccount>>,
    vaults: Arc<DashMap<String, CredentialVault>>,
    checkouts: Arc<DashMap<String, Checkout>>,
    recordings: Arc<DashMap<String, SessionRecording>>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
    pub listeners: ListenerRegistry,
}

impl PrivilegedAccessManager {
    pub fn new(hasher: Arc<dyn PasswordHasher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            accounts: Arc::new(DashMap::new()),
            vaults: Arc::new(DashMap::new()),
            checkouts: Arc::new(DashMap::new()),
            recordings: Arc::new(DashMap::new()),
            hasher,
            clock,
            listeners: ListenerRegistry::new(),
        }
    }

    fn emit(&self, name: &str, checkout_id: &str) {
        let mut payload = BTreeMap::new();
        payload.insert("checkoutId".to_string(), checkout_id.to_string().into());
        self.listeners.dispatch(&IamEvent::new(name, payload, self.clock.now()));
    }

    pub fn register_account(&self, name: impl Into<String>, system: impl Into<String>, initial_secret: &str) -> (PrivilegedAccount, CredentialVault) {
        let now = self.clock.now();
        let vault_id = new_id();
        let account = PrivilegedAccount::new(new_id(), name, system, vault_id.clone(), now);
        let vault = CredentialVault::new(vault_id, account.id.clone(), self.hasher.hash(initial_secret), now);

        self.accounts.insert(account.id.clone(), account.clone());
        self.vaults.insert(vault.id.clone(), vault.clone());
        (account, vault)
    }

    pub fn get_account(&self, id: &str) -> IamResult<PrivilegedAccount> {
        self.accounts.get(id).map(|e| e.value().clone()).ok_or_else(|| IamError::not_found("PrivilegedAccount", id))
    }

    pub fn rotate_secret(&self, account_id: &str, new_secret: &str) -> IamResult<()> {
        let account = self.get_account(account_id)?;
        let mut vault = self.vaults.get_mut(&account.vault_entry_id).ok_or_else(|| IamError::not_found("CredentialVault", &account.vault_entry_id))?;
        vault.rotate(self.hasher.hash(new_secret), self.clock.now());
        Ok(())
    }

    /// Request a checkout. Auto-approves immediately when the account does
    /// not require approval; otherwise leaves it `Pending` for `approve`.
    pub fn request_checkout(&self, account_id: &str, requester_id: impl Into<String>, justification: impl Into<String>) -> IamResult<Checkout> {
        let account = self.get_account(account_id)?;
        let now = self.clock.now();
        let mut checkout = Checkout::new(new_id(), account_id, requester_id, justification, now);
        if !account.requires_approval {
            checkout.approve(now + Duration::minutes(account.max_checkout_minutes as i64))?;
        }
        self.checkouts.insert(checkout.id.clone(), checkout.clone());
        self.emit(if checkout.status == CheckoutStatus::Active { "checkoutApproved" } else { "checkoutRequested" }, &checkout.id);
        Ok(checkout)
    }

    pub fn approve_checkout(&self, checkout_id: &str) -> IamResult<Checkout> {
        let account_id = {
            let entry = self.checkouts.get(checkout_id).ok_or_else(|| IamError::not_found("Checkout", checkout_id))?;
            entry.privileged_account_id.clone()
        };
        let account = self.get_account(&account_id)?;
        let mut entry = self.checkouts.get_mut(checkout_id).ok_or_else(|| IamError::not_found("Checkout", checkout_id))?;
        let now = self.clock.now();
        entry.approve(now + Duration::minutes(account.max_checkout_minutes as i64))?;
        let updated = entry.value().clone();
        drop(entry);
        self.emit("checkoutApproved", checkout_id);
        Ok(updated)
    }

    pub fn deny_checkout(&self, checkout_id: &str) -> IamResult<Checkout> {
        let mut entry = self.checkouts.get_mut(checkout_id).ok_or_else(|| IamError::not_found("Checkout", checkout_id))?;
        entry.deny()?;
        let updated = entry.value().clone();
        drop(entry);
        self.emit("checkoutDenied", checkout_id);
        Ok(updated)
    }

    /// Reveal the vaulted credential to an active checkout holder and start
    /// a session recording. Verifies the checkout is active and not expired.
    pub fn reveal_credential(&self, checkout_id: &str) -> IamResult<StoredCredential> {
        let account_id = {
            let mut entry = self.checkouts.get_mut(checkout_id).ok_or_else(|| IamError::not_found("Checkout", checkout_id))?;
            let now = self.clock.now();
            if entry.is_expired(now) {
                entry.status = CheckoutStatus::Expired;
                return Err(IamError::state_conflict("Checkout", "expired", "reveal-credential"));
            }
            if entry.status != CheckoutStatus::Active {
                return Err(IamError::state_conflict("Checkout", entry.status.to_string(), "reveal-credential"));
            }
            entry.privileged_account_id.clone()
        };
        let account = self.get_account(&account_id)?;
        let vault = self.vaults.get(&account.vault_entry_id).ok_or_else(|| IamError::not_found("CredentialVault", &account.vault_entry_id))?;

        self.recordings.entry(checkout_id.to_string()).or_insert_with(|| SessionRecording::new(checkout_id, self.clock.now()));
        Ok(vault.secret.clone())
    }

    pub fn log_command(&self, checkout_id: &str, command: impl Into<String>) -> IamResult<()> {
        let mut recording = self.recordings.get_mut(checkout_id).ok_or_else(|| IamError::not_found("SessionRecording", checkout_id))?;
        recording.append(command);
        Ok(())
    }

    pub fn return_checkout(&self, checkout_id: &str) -> IamResult<Checkout> {
        let mut entry = self.checkouts.get_mut(checkout_id).ok_or_else(|| IamError::not_found("Checkout", checkout_id))?;
        let now = self.clock.now();
        entry.return_account(now)?;
        let updated = entry.value().clone();
        drop(entry);
        if let Some(mut recording) = self.recordings.get_mut(checkout_id) {
            recording.end(now);
        }
        self.emit("checkoutReturned", checkout_id);
        Ok(updated)
    }

    pub fn get_session_recording(&self, checkout_id: &str) -> IamResult<SessionRecording> {
        self.recordings.get(checkout_id).map(|e| e.value().clone()).ok_or_else(|| IamError::not_found("SessionRecording", checkout_id))
    }

    /// Sweep active checkouts whose TTL has lapsed, marking them `Expired`.
    pub fn expire_stale_checkouts(&self) -> usize {
        let now = self.clock.now();
        let mut expired = 0;
        for mut entry in self.checkouts.iter_mut() {
            if entry.is_expired(now) {
                entry.status = CheckoutStatus::Expired;
                expired += 1;
            }
        }
        expired
    }
}

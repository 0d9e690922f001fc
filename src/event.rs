//! Event fan-out (spec §9 "cyclic event fan-out is one-way"): each
//! subsystem owns a list of listeners and fires them synchronously, in
//! registration order, on every state change. The Orchestrator registers
//! itself as a listener on every subsystem and re-emits onto its own
//! `IAMEvent` bus plus the Monitoring counters. There are no back-edges:
//! subsystems never call into the orchestrator directly.

use crate::core::error::ListenerError;
use crate::core::value::AttributeValue;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::RwLock;
use tracing::warn;

/// A named state-change notification, with a loosely-typed payload.
#[derive(Debug, Clone)]
pub struct IamEvent {
    pub name: String,
    pub payload: BTreeMap<String, AttributeValue>,
    pub emitted_at: DateTime<Utc>,
}

impl IamEvent {
    pub fn new(name: impl Into<String>, payload: BTreeMap<String, AttributeValue>, now: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            payload,
            emitted_at: now,
        }
    }
}

type Listener = Box<dyn Fn(&IamEvent) -> Result<(), ListenerError> + Send + Sync>;

/// A per-subsystem listener list. Registration order is preserved; a
/// listener that errors is logged and swallowed, never propagated (spec §7).
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: RwLock<Vec<Listener>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, listener: Listener) {
        self.listeners.write().expect("listener registry lock poisoned").push(listener);
    }

    /// Fire every registered listener in order, swallowing and logging
    /// individual failures so one bad listener never disrupts fan-out.
    pub fn dispatch(&self, event: &IamEvent) {
        let listeners = self.listeners.read().expect("listener registry lock poisoned");
        for listener in listeners.iter() {
            if let Err(err) = listener(event) {
                warn!(event = %event.name, error = %err, "listener failed, continuing dispatch");
            }
        }
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry").finish_non_exhaustive()
    }
}

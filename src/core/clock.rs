//! Clock port.
//!
//! Spec §5/§9 call out wall-clock reads (token expiry, MFA challenge expiry,
//! lockout, assessment expiry, decision cache TTL) as a cross-cutting
//! concern that must be abstracted so tests can advance time deterministically
//! instead of sleeping. Every subsystem takes `Arc<dyn Clock>` at
//! construction rather than calling `chrono::Utc::now()` inline.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Real wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A settable clock for deterministic tests. Stores a Unix timestamp (ms)
/// in an atomic so it can be shared (`Arc<FixedClock>`) and advanced from
/// the test body while subsystems hold the same `Arc<dyn Clock>`.
#[derive(Debug)]
pub struct FixedClock {
    millis: AtomicI64,
}

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self {
            millis: AtomicI64::new(at.timestamp_millis()),
        }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        self.millis.store(at.timestamp_millis(), Ordering::SeqCst);
    }

    pub fn advance(&self, delta: chrono::Duration) {
        let new_at = self.now() + delta;
        self.set(new_at);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst))
            .unwrap_or_else(Utc::now)
    }
}

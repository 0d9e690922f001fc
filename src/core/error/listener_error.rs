/// An error raised inside an event listener callback.
///
/// Per spec §5 ("listener exceptions MUST be swallowed") and §7
/// (`ListenerError` never propagates), this type is only ever logged by
/// [`crate::event::ListenerRegistry::dispatch`] — it is deliberately not a
/// variant callers can observe through any public subsystem operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerError {
    pub event_name: String,
    pub detail: String,
}

impl ListenerError {
    pub fn new(event_name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            event_name: event_name.into(),
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for ListenerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "listener for '{}' failed: {}", self.event_name, self.detail)
    }
}

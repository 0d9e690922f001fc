//! Error semantics for the IAM core.
//!
//! This module defines the complete error surface described by the spec's
//! error-handling design: every subsystem operation that can fail
//! structurally returns `IamResult<T>`; operations whose outcome is itself
//! domain data (authentication, token validation, MFA) return a result value
//! instead and never an `IamError`.
//!
//! Design principles (matching the teacher's `CoreError` split):
//! - **No transport concepts**: no HTTP status codes or similar leak in here.
//! - **No exceptions**: errors are values.
//! - **Domain language**: variants name what went wrong, not how it was detected.
pub mod auth_failure;
pub mod constraint_violation;
pub mod invalid_input;
pub mod listener_error;
pub mod not_found;
pub mod state_conflict;

pub use auth_failure::{AuthFailureError, AuthFailureReason};
pub use constraint_violation::{ConstraintKind, ConstraintViolationError};
pub use invalid_input::InvalidInputError;
pub use listener_error::ListenerError;
pub use not_found::NotFoundError;
pub use state_conflict::StateConflictError;

/// The crate-wide error type. Every fallible subsystem operation returns
/// `IamResult<T> = Result<T, IamError>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IamError {
    NotFound(NotFoundError),
    ConstraintViolation(ConstraintViolationError),
    StateConflict(StateConflictError),
    InvalidInput(InvalidInputError),
    AuthFailure(AuthFailureError),
}

pub type IamResult<T> = Result<T, IamError>;

impl IamError {
    pub fn not_found(entity_kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound(NotFoundError::new(entity_kind, id))
    }

    pub fn state_conflict(
        entity_kind: impl Into<String>,
        current_state: impl Into<String>,
        attempted: impl Into<String>,
    ) -> Self {
        Self::StateConflict(StateConflictError::new(entity_kind, current_state, attempted))
    }

    pub fn invalid_input(field: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::InvalidInput(InvalidInputError::new(field, detail))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::ConstraintViolation(_))
    }

    pub fn is_state_conflict(&self) -> bool {
        matches!(self, Self::StateConflict(_))
    }
}

impl std::fmt::Display for IamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(e) => write!(f, "{}", e),
            Self::ConstraintViolation(e) => write!(f, "{}", e),
            Self::StateConflict(e) => write!(f, "{}", e),
            Self::InvalidInput(e) => write!(f, "{}", e),
            Self::AuthFailure(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for IamError {}

impl From<NotFoundError> for IamError {
    fn from(err: NotFoundError) -> Self {
        Self::NotFound(err)
    }
}

impl From<ConstraintViolationError> for IamError {
    fn from(err: ConstraintViolationError) -> Self {
        Self::ConstraintViolation(err)
    }
}

impl From<StateConflictError> for IamError {
    fn from(err: StateConflictError) -> Self {
        Self::StateConflict(err)
    }
}

impl From<InvalidInputError> for IamError {
    fn from(err: InvalidInputError) -> Self {
        Self::InvalidInput(err)
    }
}

impl From<AuthFailureError> for IamError {
    fn from(err: AuthFailureError) -> Self {
        Self::AuthFailure(err)
    }
}

//! Authentication Engine domain types: policies, MFA enrollment/challenge,
//! login history, and the structured authentication result.

mod login_history;
mod mfa;
mod policy;
mod result;

pub use login_history::LoginHistoryEntry;
pub use mfa::{MfaChallenge, MfaEnrollment, MfaMethod};
pub use policy::{AuthPolicy, AuthPolicyConditionMode, AuthPolicyConditions};
pub use result::{AuthenticationResult, AuthenticationStatus};

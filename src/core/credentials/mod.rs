//! Credential Manager domain types: password policy, raw/stored credential
//! distinction, and the rotation-tracked credential record.

mod credential_policy;
mod credential_record;
mod raw_credential;
mod stored_credential;

pub use credential_policy::CredentialPolicy;
pub use credential_record::{CredentialRecord, CredentialRecordStatus};
pub use raw_credential::RawCredential;
pub use stored_credential::StoredCredential;

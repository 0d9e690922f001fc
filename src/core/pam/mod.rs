mod checkout;
mod privileged_account;
mod vault;

pub use checkout::{Checkout, CheckoutStatus, SessionRecording};
pub use privileged_account::PrivilegedAccount;
pub use vault::CredentialVault;

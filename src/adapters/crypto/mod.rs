//! Crypto adapters. Spec §1 stubs real cryptography: password hashing is
//! genuine (Argon2id), but token "signing" and fingerprinting are clearly
//! marked non-cryptographic stand-ins a production build would replace.

pub mod fingerprint;
pub mod nonce;
pub mod password_hash;
pub mod token_envelope;

//! Argon2id password hashing, adapted from the teacher's `Argon2PasswordHasher`.
//!
//! Pure cryptographic: no policy logic, no version tracking. All parameters
//! are injected via the constructor; there are no hardcoded defaults.

use crate::core::credentials::StoredCredential;
use crate::core::error::{IamError, IamResult};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as Argon2Hasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

/// Contract for password hashing and verification. Adapters implement this
/// with a concrete algorithm; core code never depends on argon2 directly.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, raw: &str) -> StoredCredential;
    fn verify(&self, raw: &str, stored: &StoredCredential) -> bool;
}

#[derive(Clone)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    pub fn new(memory_cost: u32, time_cost: u32, parallelism: u32) -> IamResult<Self> {
        let params = Params::new(memory_cost, time_cost, parallelism, None)
            .map_err(|e| IamError::invalid_input("argon2_params", e.to_string()))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self::new(65536, 3, 4).expect("OWASP-recommended argon2 parameters are always valid")
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, raw: &str) -> StoredCredential {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(raw.as_bytes(), &salt)
            .expect("argon2 hashing does not fail with valid parameters");
        StoredCredential::from_hash(hash.to_string())
    }

    fn verify(&self, raw: &str, stored: &StoredCredential) -> bool {
        let Ok(parsed) = PasswordHash::new(stored.as_hash_str()) else {
            return false;
        };
        self.argon2.verify_password(raw.as_bytes(), &parsed).is_ok()
    }
}

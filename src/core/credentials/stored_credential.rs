/// Opaque representation of a persisted credential (hashed/encoded).
///
/// Core must not know about the hashing algorithm or the inner
/// representation. This type intentionally keeps its inner data private and
/// does not provide comparison or accessors that would expose the hash.
pub struct StoredCredential {
    repr: String,
}

impl StoredCredential {
    /// Construct from an already-produced opaque representation. Adapters
    /// (the `PasswordHasher` port implementation) are expected to build this
    /// from whatever hash/PHC string they produce; core treats it as opaque.
    pub fn from_hash(hash: impl Into<String>) -> Self {
        Self { repr: hash.into() }
    }

    pub fn as_hash_str(&self) -> &str {
        &self.repr
    }

    pub fn is_non_empty(&self) -> bool {
        !self.repr.is_empty()
    }
}

impl Clone for StoredCredential {
    fn clone(&self) -> Self {
        Self { repr: self.repr.clone() }
    }
}

impl std::fmt::Debug for StoredCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StoredCredential([REDACTED])")
    }
}

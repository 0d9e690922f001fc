//! Token envelope fingerprinting. Spec §4.3 leaves the fingerprint hash
//! implementation-defined; this adapter fixes it as SHA-256 over the
//! encoded envelope, truncated to its first 16 hex characters.

use sha2::{Digest, Sha256};

pub fn fingerprint(envelope: &str) -> String {
    let digest = Sha256::digest(envelope.as_bytes());
    let hex = hex::encode(digest);
    hex[..16].to_string()
}

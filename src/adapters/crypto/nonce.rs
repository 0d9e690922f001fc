//! Opaque id and nonce generation for tokens, sessions, OIDC state/nonce,
//! and PKCE code verifiers.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};
use uuid::Uuid;

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// A URL-safe random value of `bytes` bytes, base64url-encoded (no padding).
/// Used for OIDC `state`, `nonce`, and PKCE `code_verifier`.
pub fn random_url_safe_token(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::rng().fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}

/// PKCE S256 code challenge derived from a code verifier (RFC 7636).
pub fn pkce_s256_challenge(code_verifier: &str) -> String {
    let digest = Sha256::digest(code_verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_tokens_are_distinct() {
        assert_ne!(random_url_safe_token(32), random_url_safe_token(32));
    }

    #[test]
    fn pkce_challenge_is_deterministic() {
        let verifier = random_url_safe_token(32);
        assert_eq!(pkce_s256_challenge(&verifier), pkce_s256_challenge(&verifier));
    }
}

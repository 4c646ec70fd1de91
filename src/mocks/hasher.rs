//! Mock credential hasher for testing.

use crate::providers::CredentialHasher;
use base64::Engine;
use constant_time_eq::constant_time_eq;
use sha2::{Digest, Sha256};

/// Mock credential hasher.
///
/// Deterministic SHA-256 digests with constant-time verification. Fast
/// enough for tests; a real deployment supplies a password KDF (bcrypt,
/// argon2) behind the same trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockHasher;

impl MockHasher {
    /// Create a new mock hasher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl CredentialHasher for MockHasher {
    fn hash(&self, password: &str) -> String {
        let digest = Sha256::digest(password.as_bytes());
        base64::engine::general_purpose::STANDARD.encode(digest)
    }

    fn verify(&self, password: &str, digest: &str) -> bool {
        constant_time_eq(self.hash(password).as_bytes(), digest.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let hasher = MockHasher::new();
        let digest = hasher.hash("secret");

        assert!(hasher.verify("secret", &digest));
        assert!(!hasher.verify("other", &digest));
    }

    #[test]
    fn test_digest_is_not_the_password() {
        let hasher = MockHasher::new();
        assert_ne!(hasher.hash("secret"), "secret");
    }
}

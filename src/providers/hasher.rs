//! Credential hasher trait.

/// One-way hash and verify for local passwords.
///
/// The concrete primitive is externally supplied (a real deployment wants
/// a password KDF such as bcrypt or argon2); the core only ever calls
/// these two operations. Verification must run in constant time with
/// respect to the digest contents.
pub trait CredentialHasher: Send + Sync {
    /// Hash a plaintext password into a storable digest.
    fn hash(&self, password: &str) -> String;

    /// Check a plaintext password against a stored digest.
    fn verify(&self, password: &str, digest: &str) -> bool;
}

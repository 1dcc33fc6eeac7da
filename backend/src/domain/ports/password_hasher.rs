//! Port abstraction for credential hashing adapters.

use crate::domain::PasswordHash;

use super::define_port_error;

define_port_error! {
    /// Failures raised by password hashing adapters.
    pub enum PasswordHasherError {
        /// Hashing or verification could not run.
        Hashing { message: String } => "password hashing failed: {message}",
    }
}

/// Hashes and verifies login passwords.
///
/// Hashing is CPU-bound and synchronous; callers on an async runtime should
/// treat a call as cheap enough for a request handler (the Argon2 parameters
/// are tuned for interactive login).
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password into PHC string format.
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHasherError>;

    /// Verify a plaintext password against a stored hash.
    ///
    /// Returns `Ok(false)` for a mismatch; `Err` only when the stored hash is
    /// malformed or the algorithm fails.
    fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, PasswordHasherError>;
}

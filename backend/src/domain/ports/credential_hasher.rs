//! Port for one-way password hashing.

use async_trait::async_trait;

use crate::domain::{PasswordHash, PlainPassword};

use super::define_port_error;

define_port_error! {
    /// Errors raised by credential hashers.
    pub enum CredentialHasherError {
        /// The hasher could not produce a hash.
        Hash { message: String } => "password hashing failed: {message}",
        /// A stored hash could not be parsed.
        MalformedHash { message: String } => "stored password hash is malformed: {message}",
    }
}

/// Hashes passwords for storage and checks candidates against stored hashes.
///
/// Implementations are expected to be deliberately slow; callers should not
/// hold locks across these calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialHasher: Send + Sync {
    /// Produce a salted hash of `password`.
    async fn hash(&self, password: &PlainPassword) -> Result<PasswordHash, CredentialHasherError>;

    /// Whether `password` matches `hash`.
    async fn verify(
        &self,
        password: &PlainPassword,
        hash: &PasswordHash,
    ) -> Result<bool, CredentialHasherError>;
}

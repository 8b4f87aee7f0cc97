//! Argon2id password hashing producing PHC strings.
//!
//! Hashing is CPU and memory heavy, so both operations run on the blocking
//! thread pool instead of an async worker.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    PasswordHash as PhcString, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};
use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::domain::ports::{CredentialHasher, CredentialHasherError};
use crate::domain::{PasswordHash, PlainPassword};

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    /// Memory in KiB.
    pub memory_kib: u32,
    /// Time iterations.
    pub iterations: u32,
    /// Parallelism degree.
    pub parallelism: u32,
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            memory_kib: 19_456, // 19 MiB
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl HashCost {
    /// Minimal cost for tests and local development.
    pub fn fast() -> Self {
        Self {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        }
    }
}

/// [`CredentialHasher`] backed by Argon2id.
#[derive(Debug, Clone)]
pub struct Argon2CredentialHasher {
    params: Params,
}

impl Argon2CredentialHasher {
    /// Create a hasher with the given cost.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialHasherError::Hash`] when the parameters are outside
    /// Argon2's accepted ranges.
    pub fn new(cost: HashCost) -> Result<Self, CredentialHasherError> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|err| CredentialHasherError::hash(err.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

async fn run_blocking<T, F>(task: F) -> Result<T, CredentialHasherError>
where
    F: FnOnce() -> Result<T, CredentialHasherError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|err| CredentialHasherError::hash(format!("hashing task failed: {err}")))?
}

#[async_trait]
impl CredentialHasher for Argon2CredentialHasher {
    async fn hash(&self, password: &PlainPassword) -> Result<PasswordHash, CredentialHasherError> {
        let argon2 = self.argon2();
        let secret = Zeroizing::new(password.expose().to_owned());
        run_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(secret.as_bytes(), &salt)
                .map(|phc| PasswordHash::new(phc.to_string()))
                .map_err(|err| CredentialHasherError::hash(err.to_string()))
        })
        .await
    }

    async fn verify(
        &self,
        password: &PlainPassword,
        hash: &PasswordHash,
    ) -> Result<bool, CredentialHasherError> {
        let argon2 = self.argon2();
        let secret = Zeroizing::new(password.expose().to_owned());
        let encoded = hash.as_str().to_owned();
        run_blocking(move || {
            let parsed = PhcString::new(&encoded)
                .map_err(|err| CredentialHasherError::malformed_hash(err.to_string()))?;
            match argon2.verify_password(secret.as_bytes(), &parsed) {
                Ok(()) => Ok(true),
                Err(argon2::password_hash::Error::Password) => Ok(false),
                Err(err) => Err(CredentialHasherError::hash(err.to_string())),
            }
        })
        .await
    }
}

//! Port abstraction for user persistence adapters and their errors.

use async_trait::async_trait;

use crate::domain::{PasswordHash, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// The email is already registered to another account.
        DuplicateEmail { email: String } => "email already registered: {email}",
    }
}

/// A user together with the stored password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: PasswordHash,
}

/// Port for reading and creating user accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. Fails with `DuplicateEmail` when the canonical
    /// email is taken.
    async fn insert(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<(), UserRepositoryError>;

    /// Look up an account and its hash by canonical email.
    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, UserRepositoryError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch every user in `ids` that exists, in no particular order.
    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, UserRepositoryError>;
}


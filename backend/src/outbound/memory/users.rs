//! In-memory `UserRepository`.

use async_trait::async_trait;

use crate::domain::ports::{UserCredentials, UserRepository, UserRepositoryError};
use crate::domain::{PasswordHash, User, UserId};

use super::MemoryStore;

/// User accounts held in a [`MemoryStore`].
#[derive(Clone)]
pub struct MemoryUserRepository {
    store: MemoryStore,
}

impl MemoryUserRepository {
    /// View over `store`.
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn insert(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<(), UserRepositoryError> {
        let mut tables = self.store.lock().map_err(UserRepositoryError::query)?;
        let email = user.email().as_ref();
        if tables
            .users
            .values()
            .any(|(existing, _)| existing.email().as_ref() == email)
        {
            return Err(UserRepositoryError::duplicate_email(email));
        }
        tables
            .users
            .insert(user.id().clone(), (user.clone(), password_hash.clone()));
        Ok(())
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, UserRepositoryError> {
        let tables = self.store.lock().map_err(UserRepositoryError::query)?;
        Ok(tables
            .users
            .values()
            .find(|(user, _)| user.email().as_ref() == email)
            .map(|(user, password_hash)| UserCredentials {
                user: user.clone(),
                password_hash: password_hash.clone(),
            }))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let tables = self.store.lock().map_err(UserRepositoryError::query)?;
        Ok(tables.users.get(id).map(|(user, _)| user.clone()))
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, UserRepositoryError> {
        let tables = self.store.lock().map_err(UserRepositoryError::query)?;
        Ok(ids
            .iter()
            .filter_map(|id| tables.users.get(id).map(|(user, _)| user.clone()))
            .collect())
    }
}

//! PostgreSQL-backed `UserRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{UserCredentials, UserRepository, UserRepositoryError};
use crate::domain::{DisplayName, EmailAddress, PasswordHash, Role, User, UserId};

use super::diesel_helpers::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

const EMAIL_CONSTRAINT: &str = "users_email_key";

/// Diesel implementation of [`UserRepository`].
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> UserRepositoryError {
    map_pool_error(error, UserRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    map_diesel_error(
        error,
        UserRepositoryError::query,
        UserRepositoryError::connection,
    )
}

fn row_to_credentials(row: UserRow) -> Result<UserCredentials, UserRepositoryError> {
    let invalid = |err: crate::domain::UserValidationError| {
        UserRepositoryError::query(format!("stored user {}: {err}", row.id))
    };
    let name = DisplayName::new(&row.name).map_err(invalid)?;
    let email = EmailAddress::new(&row.email).map_err(invalid)?;
    let role: Role = row.role.parse().map_err(invalid)?;
    let user = User::new(UserId::from_uuid(row.id), name, email, role, row.created_at);
    Ok(UserCredentials {
        user,
        password_hash: PasswordHash::new(row.password_hash),
    })
}

fn row_to_user(row: UserRow) -> Result<User, UserRepositoryError> {
    row_to_credentials(row).map(|credentials| credentials.user)
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = NewUserRow {
            id: *user.id().as_uuid(),
            name: user.name().as_ref(),
            email: user.email().as_ref(),
            role: user.role().as_str(),
            password_hash: password_hash.as_str(),
            created_at: user.created_at(),
        };
        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(|err| {
                if is_unique_violation(&err, EMAIL_CONSTRAINT) {
                    UserRepositoryError::duplicate_email(user.email().as_ref())
                } else {
                    diesel_error(err)
                }
            })?;
        Ok(())
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .map(row_to_credentials)
            .transpose()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .map(row_to_user)
            .transpose()
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, UserRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let rows: Vec<UserRow> = users::table
            .filter(users::id.eq_any(uuids))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        rows.into_iter().map(row_to_user).collect()
    }
}

//! Identity service: registration, login and bearer-token resolution.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::TimeDelta;
use mockable::Clock;
use tracing::{debug, info};

use crate::domain::populate::map_user_repository_error;
use crate::domain::ports::{
    AccessTokenCodec, AccessTokenError, CredentialHasher, CredentialHasherError, IdentityService,
    UserCredentials, UserRepository, UserRepositoryError,
};
use crate::domain::{
    AccessToken, AuthSession, Error, LoginCredentials, Registration, TokenClaims, User, UserId,
};

/// Token lifetime in seconds used unless the server configures another.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

const DUPLICATE_EMAIL_MESSAGE: &str = "User with this email already exists";

fn map_hasher_error(error: CredentialHasherError) -> Error {
    Error::internal(format!("credential hasher failed: {error}"))
}

fn map_token_error(error: AccessTokenError) -> Error {
    Error::internal(format!("token issue failed: {error}"))
}

/// Identity service implementing the [`IdentityService`] driving port.
#[derive(Clone)]
pub struct IdentityServiceImpl<U, H, T> {
    users: Arc<U>,
    hasher: Arc<H>,
    tokens: Arc<T>,
    clock: Arc<dyn Clock>,
    token_ttl: TimeDelta,
}

impl<U, H, T> IdentityServiceImpl<U, H, T> {
    /// Create a service issuing tokens valid for [`DEFAULT_TOKEN_TTL_SECS`].
    pub fn new(users: Arc<U>, hasher: Arc<H>, tokens: Arc<T>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            hasher,
            tokens,
            clock,
            token_ttl: TimeDelta::seconds(DEFAULT_TOKEN_TTL_SECS),
        }
    }

    /// Override the token lifetime.
    #[must_use]
    pub fn with_token_ttl(mut self, token_ttl: TimeDelta) -> Self {
        self.token_ttl = token_ttl;
        self
    }
}

impl<U, H, T> IdentityServiceImpl<U, H, T>
where
    T: AccessTokenCodec,
{
    fn issue_session(&self, user: User) -> Result<AuthSession, Error> {
        let claims = TokenClaims::for_user(&user, self.clock.utc(), self.token_ttl);
        let token: AccessToken = self.tokens.issue(&claims).map_err(map_token_error)?;
        Ok(AuthSession { user, token })
    }
}

#[async_trait]
impl<U, H, T> IdentityService for IdentityServiceImpl<U, H, T>
where
    U: UserRepository,
    H: CredentialHasher,
    T: AccessTokenCodec,
{
    async fn register(&self, registration: Registration) -> Result<AuthSession, Error> {
        let existing = self
            .users
            .find_credentials_by_email(registration.email().as_ref())
            .await
            .map_err(map_user_repository_error)?;
        if existing.is_some() {
            return Err(Error::conflict(DUPLICATE_EMAIL_MESSAGE));
        }

        let password_hash = self
            .hasher
            .hash(registration.password())
            .await
            .map_err(map_hasher_error)?;

        let user = User::new(
            UserId::random(),
            registration.name().clone(),
            registration.email().clone(),
            registration.role(),
            self.clock.utc(),
        );

        // A concurrent registration can still win the race after the lookup.
        self.users
            .insert(&user, &password_hash)
            .await
            .map_err(|error| match error {
                UserRepositoryError::DuplicateEmail { .. } => {
                    Error::conflict(DUPLICATE_EMAIL_MESSAGE)
                }
                other => map_user_repository_error(other),
            })?;

        info!(user_id = %user.id(), role = %user.role(), "user registered");
        self.issue_session(user)
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<AuthSession, Error> {
        let Some(UserCredentials {
            user,
            password_hash,
        }) = self
            .users
            .find_credentials_by_email(credentials.email())
            .await
            .map_err(map_user_repository_error)?
        else {
            return Err(Error::not_found("User not found"));
        };

        let matches = self
            .hasher
            .verify(credentials.password(), &password_hash)
            .await
            .map_err(map_hasher_error)?;
        if !matches {
            debug!(user_id = %user.id(), "login rejected: password mismatch");
            return Err(Error::unauthorized("Invalid credentials"));
        }

        self.issue_session(user)
    }

    async fn resolve_token(&self, token: &str) -> Result<Option<User>, Error> {
        let claims = match self.tokens.verify(token, self.clock.utc()) {
            Ok(claims) => claims,
            Err(error) => {
                debug!(%error, "bearer token rejected");
                return Ok(None);
            }
        };

        self.users
            .find_by_id(&claims.user_id)
            .await
            .map_err(map_user_repository_error)
    }
}

#[cfg(test)]
#[path = "identity_service_tests.rs"]
mod tests;

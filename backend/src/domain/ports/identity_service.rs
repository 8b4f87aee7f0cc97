//! Driving port for account registration, login and token resolution.

use async_trait::async_trait;

use crate::domain::{AuthSession, Error, LoginCredentials, Registration, User};

/// Identity operations used by the auth endpoints and the session extractor.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Create an account and issue its first token.
    ///
    /// Fails with `conflict` when the email is already registered.
    async fn register(&self, registration: Registration) -> Result<AuthSession, Error>;

    /// Check credentials and issue a token.
    ///
    /// Fails with `not_found` for an unknown email and `unauthorized` for a
    /// wrong password.
    async fn login(&self, credentials: LoginCredentials) -> Result<AuthSession, Error>;

    /// Resolve a bearer token to its user.
    ///
    /// Any verification failure (malformed, expired, wrong signature) or a
    /// token for a user that no longer exists yields `Ok(None)`. Only
    /// repository failures surface as errors.
    async fn resolve_token(&self, token: &str) -> Result<Option<User>, Error>;
}

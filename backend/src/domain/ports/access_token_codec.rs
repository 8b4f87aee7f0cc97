//! Port for issuing and verifying signed bearer tokens.

use chrono::{DateTime, Utc};

use crate::domain::{AccessToken, TokenClaims};

use super::define_port_error;

define_port_error! {
    /// Reasons a token cannot be issued or accepted.
    pub enum AccessTokenError {
        /// The token text is not a well-formed token.
        Malformed { message: String } => "access token is malformed: {message}",
        /// The signature does not match the signing key.
        BadSignature => "access token signature is invalid",
        /// The token's expiry has passed.
        Expired => "access token has expired",
        /// Claims could not be encoded.
        Encode { message: String } => "access token could not be encoded: {message}",
    }
}

/// Encodes claims into signed tokens and decodes them back.
#[cfg_attr(test, mockall::automock)]
pub trait AccessTokenCodec: Send + Sync {
    /// Sign `claims` into a bearer token.
    fn issue(&self, claims: &TokenClaims) -> Result<AccessToken, AccessTokenError>;

    /// Check signature and expiry at `now` and return the claims.
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, AccessTokenError>;
}

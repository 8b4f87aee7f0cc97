//! Bearer-token session extraction.
//!
//! Handlers take a [`SessionContext`] and call [`SessionContext::require_user`]
//! when the endpoint needs a caller. Extraction itself never fails for a
//! missing or bad token, so public endpoints can accept the extractor too.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::{debug, error};

use crate::domain::{Error, User};
use crate::inbound::http::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// Caller identity resolved from the `Authorization` header.
#[derive(Debug, Clone, Default)]
pub struct SessionContext(Option<User>);

impl SessionContext {
    /// Wrap an already resolved user.
    pub fn new(user: Option<User>) -> Self {
        Self(user)
    }

    /// Authenticated user, if the request carried a valid token.
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }

    /// Require an authenticated user or return `401 Unauthorized`.
    pub fn require_user(&self) -> Result<&User, Error> {
        self.0
            .as_ref()
            .ok_or_else(|| Error::unauthorized("Authentication required"))
    }
}

/// Token carried by an `Authorization: Bearer <token>` header.
pub(crate) fn bearer_token(req: &HttpRequest) -> Option<String> {
    let header = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix(BEARER_PREFIX)?.trim();
    (!token.is_empty()).then(|| token.to_owned())
}

impl FromRequest for SessionContext {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        Box::pin(async move {
            let Some(token) = token else {
                return Ok(Self(None));
            };
            let Some(state) = state else {
                error!("HttpState missing from app data; cannot resolve bearer token");
                return Err(Error::internal("session state is not configured"));
            };
            let user = state.identity.resolve_token(&token).await?;
            if user.is_none() {
                debug!("bearer token rejected");
            }
            Ok(Self(user))
        })
    }
}

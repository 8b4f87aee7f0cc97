//! HTTP inbound adapter exposing the forum's REST endpoints.

pub mod admin;
pub mod answers;
pub mod auth;
pub mod error;
pub mod health;
pub mod notifications;
pub mod page_envelope;
pub mod questions;
pub mod schemas;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod token_config;
pub(crate) mod validation;
pub mod votes;

pub use error::ApiResult;

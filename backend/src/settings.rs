//! Server settings loaded via OrthoConfig.
//!
//! Values come from `FORUM_*` environment variables, configuration files or
//! command-line flags, in OrthoConfig's usual precedence.

use std::net::{AddrParseError, SocketAddr};

use chrono::TimeDelta;
use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::DEFAULT_TOKEN_TTL_SECS;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POOL_SIZE: u32 = 10;

/// Process-level configuration for the forum server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "FORUM")]
pub struct ServerSettings {
    /// Listen address; defaults to `0.0.0.0:8080`.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Without one the server keeps data in memory.
    pub database_url: Option<String>,
    /// Maximum pooled connections.
    pub pool_size: Option<u32>,
    /// Apply embedded migrations before serving; defaults to on.
    pub run_migrations: Option<bool>,
    /// Bearer token lifetime in seconds.
    pub token_ttl_secs: Option<i64>,
    /// Repair unlinked answers once at startup; defaults to off.
    pub reconcile_on_startup: Option<bool>,
}

impl ServerSettings {
    /// Parsed listen address.
    ///
    /// # Errors
    /// Fails when the configured value is not `host:port`.
    pub fn bind_addr(&self) -> Result<SocketAddr, AddrParseError> {
        self.bind_addr
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
    }

    pub fn pool_size(&self) -> u32 {
        self.pool_size.unwrap_or(DEFAULT_POOL_SIZE)
    }

    pub fn run_migrations(&self) -> bool {
        self.run_migrations.unwrap_or(true)
    }

    pub fn reconcile_on_startup(&self) -> bool {
        self.reconcile_on_startup.unwrap_or(false)
    }

    /// Token lifetime; non-positive values fall back to the default.
    pub fn token_ttl(&self) -> TimeDelta {
        let secs = self
            .token_ttl_secs
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TOKEN_TTL_SECS);
        TimeDelta::seconds(secs)
    }
}

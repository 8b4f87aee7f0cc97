//! Forum backend entry-point: loads settings and the token key, picks the
//! storage adapters, and serves the REST API until shutdown.

use std::sync::Arc;

#[cfg(feature = "metrics")]
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use actix_web::web;
use color_eyre::eyre::{Result, WrapErr, eyre};
use mockable::{DefaultClock, DefaultEnv};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use forum_backend::inbound::http::health::HealthState;
use forum_backend::inbound::http::token_config::{BuildMode, token_key_from_env};
use forum_backend::outbound::memory::MemoryStore;
use forum_backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use forum_backend::outbound::security::{Argon2CredentialHasher, HashCost, HmacTokenCodec};
use forum_backend::server::{
    ForumServices, SecurityAdapters, ServerConfig, build_notification_metrics, create_server,
    diesel_services, memory_services,
};
use forum_backend::settings::ServerSettings;

#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load().map_err(|e| eyre!("failed to load settings: {e}"))?;
    let bind_addr = settings.bind_addr().wrap_err("invalid bind address")?;
    let key = token_key_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .wrap_err("failed to load token signing key")?;
    let security = SecurityAdapters {
        hasher: Arc::new(
            Argon2CredentialHasher::new(HashCost::default())
                .map_err(|e| eyre!("invalid password hashing parameters: {e}"))?,
        ),
        tokens: Arc::new(HmacTokenCodec::new(key.into_bytes())),
        token_ttl: settings.token_ttl(),
    };

    let config = ServerConfig::new(bind_addr);
    #[cfg(feature = "metrics")]
    let config = config.with_metrics(initialize_metrics(|| {
        PrometheusMetricsBuilder::new("forum")
            .endpoint("/metrics")
            .build()
    }));
    let metrics = build_notification_metrics(&config)?;
    let clock = Arc::new(DefaultClock);

    let services = match settings.database_url.as_deref() {
        Some(url) => {
            if settings.run_migrations() {
                run_pending_migrations(url).await?;
            }
            let pool = DbPool::new(PoolConfig::new(url).with_max_size(settings.pool_size()))
                .await
                .wrap_err("failed to build database pool")?;
            info!(pool_size = settings.pool_size(), "using PostgreSQL storage");
            diesel_services(&pool, security, metrics, clock)
        }
        None => {
            warn!("FORUM_DATABASE_URL not set; data lives in memory and is lost on exit");
            memory_services(&MemoryStore::new(), security, metrics, clock)
        }
    };

    if settings.reconcile_on_startup() {
        reconcile(&services).await;
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config, services.http_state.clone())?;
    info!(%bind_addr, "forum backend listening");
    let served = server.await;

    health_state.mark_unhealthy();
    if services.dispatcher.pending() > 0 {
        info!(
            pending = services.dispatcher.pending(),
            "waiting for notification deliveries"
        );
    }
    services.dispatcher.wait_idle().await;
    served.wrap_err("server terminated with an error")
}

async fn reconcile(services: &ForumServices) {
    match services.http_state.answers.reconcile_links().await {
        Ok(report) => info!(
            unlinked = report.unlinked,
            relinked = report.relinked,
            failed = report.failed,
            "startup answer reconciliation finished"
        ),
        Err(error) => warn!(%error, "startup answer reconciliation failed"),
    }
}

/// Build the Prometheus middleware, logging and dropping it on failure.
#[cfg(feature = "metrics")]
fn initialize_metrics<F, E>(build: F) -> Option<PrometheusMetrics>
where
    F: FnOnce() -> Result<PrometheusMetrics, E>,
    E: std::fmt::Display,
{
    match build() {
        Ok(metrics) => Some(metrics),
        Err(e) => {
            warn!(error = %e, "failed to initialise Prometheus metrics; continuing without");
            None
        }
    }
}

//! Server construction and middleware wiring.

mod config;
#[cfg(feature = "metrics")]
mod metrics;
mod state_builders;

pub use config::ServerConfig;
pub use state_builders::{
    ForumServices, Repositories, SecurityAdapters, SharedDispatcher, assemble, diesel_services,
    memory_services,
};

#[cfg(feature = "metrics")]
use metrics::MetricsLayer;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use crate::Trace;
#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::ports::{NoOpNotificationMetrics, NotificationMetrics};
use crate::inbound::http::admin::reconcile_answer_links;
use crate::inbound::http::answers::{
    accept_answer, create_answer, list_answers, list_question_answers,
};
use crate::inbound::http::auth::{current_user, login, register};
use crate::inbound::http::error::{json_error_handler, query_error_handler};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::notifications::{
    create_notification, delete_notifications, list_notifications, update_notification,
};
use crate::inbound::http::questions::{
    close_question, create_question, get_question, list_questions,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::votes::{get_vote, vote};
#[cfg(feature = "metrics")]
use crate::outbound::metrics::PrometheusNotificationMetrics;

/// Register every REST handler; mounted under `/api` by [`build_app`].
pub fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(register)
        .service(login)
        .service(current_user)
        .service(create_question)
        .service(list_questions)
        .service(list_question_answers)
        .service(get_question)
        .service(close_question)
        .service(create_answer)
        .service(list_answers)
        .service(accept_answer)
        .service(vote)
        .service(get_vote)
        .service(list_notifications)
        .service(create_notification)
        .service(update_notification)
        .service(delete_notifications)
        .service(reconcile_answer_links);
}

/// Notification delivery metrics for the configured build.
///
/// # Errors
/// Returns [`std::io::Error`] if the Prometheus counter cannot be registered.
#[cfg(feature = "metrics")]
pub fn build_notification_metrics(
    config: &ServerConfig,
) -> std::io::Result<Arc<dyn NotificationMetrics>> {
    match &config.prometheus {
        Some(prom) => {
            let metrics = PrometheusNotificationMetrics::new(&prom.registry).map_err(|e| {
                std::io::Error::other(format!("notification metrics registration failed: {e}"))
            })?;
            Ok(Arc::new(metrics))
        }
        None => Ok(Arc::new(NoOpNotificationMetrics)),
    }
}

/// Notification delivery metrics for the configured build.
///
/// Without the `metrics` feature deliveries are only logged.
#[cfg(not(feature = "metrics"))]
pub fn build_notification_metrics(
    _config: &ServerConfig,
) -> std::io::Result<Arc<dyn NotificationMetrics>> {
    Ok(Arc::new(NoOpNotificationMetrics))
}

/// Application with probes, the `/api` scope and, in debug builds, Swagger UI.
pub fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .wrap(Trace)
        .service(web::scope("/api").configure(api_routes))
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Bind an Actix HTTP server over `http_state` and mark the probes ready.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
    http_state: HttpState,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = web::Data::new(http_state);
    let ServerConfig {
        bind_addr,
        #[cfg(feature = "metrics")]
        prometheus,
    } = config;

    #[cfg(feature = "metrics")]
    let metrics_layer = MetricsLayer::from_option(prometheus);

    let server = HttpServer::new(move || {
        let app = build_app(server_health_state.clone(), http_state.clone());

        #[cfg(feature = "metrics")]
        let app = app.wrap(metrics_layer.clone());

        app
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

//! Request metrics middleware that is a pass-through when Prometheus is off.
//!
//! Wrapping the app with either branch yields the same boxed service type, so
//! the factory closure in `create_server` stays monomorphic.

use std::sync::Arc;

use actix_service::{
    Service, ServiceExt as _, Transform,
    boxed::{self, BoxService},
};
use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Compat;
use actix_web_prom::PrometheusMetrics;
use futures_util::future::LocalBoxFuture;

type BoxedService = BoxService<ServiceRequest, ServiceResponse<BoxBody>, actix_web::Error>;

#[derive(Clone)]
pub(crate) struct MetricsLayer {
    prometheus: Option<Arc<PrometheusMetrics>>,
}

impl MetricsLayer {
    #[must_use]
    pub(crate) fn from_option(prometheus: Option<PrometheusMetrics>) -> Self {
        Self {
            prometheus: prometheus.map(Arc::new),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for MetricsLayer
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = BoxedService;
    type Future = LocalBoxFuture<'static, Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        let Some(prometheus) = self.prometheus.clone() else {
            let passthrough =
                service.map(|response: ServiceResponse<B>| response.map_into_boxed_body());
            return Box::pin(async move { Ok(boxed::service(passthrough)) });
        };
        let instrumented = Compat::new((*prometheus).clone()).new_transform(service);
        Box::pin(async move { Ok(boxed::service(instrumented.await?)) })
    }
}

//! Prometheus counter for notification delivery outcomes.
//!
//! - **Name**: `forum_notification_deliveries_total`
//! - **Labels**: `outcome` (`delivered` or `dropped`), `kind` (notification type)

use async_trait::async_trait;
use prometheus::{CounterVec, Opts, Registry};

use crate::domain::NotificationKind;
use crate::domain::ports::{NotificationMetrics, NotificationMetricsError};

/// Prometheus-backed [`NotificationMetrics`].
pub struct PrometheusNotificationMetrics {
    deliveries_total: CounterVec,
}

impl PrometheusNotificationMetrics {
    /// Create the counter and register it with `registry`.
    ///
    /// # Errors
    ///
    /// Fails when a metric with the same name is already registered.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let deliveries_total = CounterVec::new(
            Opts::new(
                "forum_notification_deliveries_total",
                "Notification writes by outcome and type",
            ),
            &["outcome", "kind"],
        )?;
        registry.register(Box::new(deliveries_total.clone()))?;
        Ok(Self { deliveries_total })
    }

    fn record(&self, outcome: &str, kind: NotificationKind) {
        self.deliveries_total
            .with_label_values(&[outcome, kind.as_str()])
            .inc();
    }
}

#[async_trait]
impl NotificationMetrics for PrometheusNotificationMetrics {
    async fn record_delivered(
        &self,
        kind: NotificationKind,
    ) -> Result<(), NotificationMetricsError> {
        self.record("delivered", kind);
        Ok(())
    }

    async fn record_dropped(&self, kind: NotificationKind) -> Result<(), NotificationMetricsError> {
        self.record("dropped", kind);
        Ok(())
    }
}

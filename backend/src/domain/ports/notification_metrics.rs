//! Port for recording notification delivery outcomes.
//!
//! Keeps the dispatcher free of any particular metrics backend. Adapters may
//! export to Prometheus or discard the data entirely.

use async_trait::async_trait;

use crate::domain::NotificationKind;

use super::define_port_error;

define_port_error! {
    /// Errors exposed when recording notification metrics.
    pub enum NotificationMetricsError {
        /// Metric exporter rejected the write.
        Export { message: String } => "notification metrics exporter failed: {message}",
    }
}

/// Metrics recording port for notification deliveries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationMetrics: Send + Sync {
    /// Record a notification that was stored.
    async fn record_delivered(&self, kind: NotificationKind)
    -> Result<(), NotificationMetricsError>;

    /// Record a notification whose write failed and was dropped.
    async fn record_dropped(&self, kind: NotificationKind) -> Result<(), NotificationMetricsError>;
}

/// Metrics sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpNotificationMetrics;

#[async_trait]
impl NotificationMetrics for NoOpNotificationMetrics {
    async fn record_delivered(
        &self,
        _kind: NotificationKind,
    ) -> Result<(), NotificationMetricsError> {
        Ok(())
    }

    async fn record_dropped(&self, _kind: NotificationKind) -> Result<(), NotificationMetricsError> {
        Ok(())
    }
}

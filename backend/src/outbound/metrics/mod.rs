//! Prometheus exporters for domain metrics ports. Only built with the
//! `metrics` feature.

mod prometheus_notifications;

pub use prometheus_notifications::PrometheusNotificationMetrics;

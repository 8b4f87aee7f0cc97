//! Best-effort notification delivery on the async runtime.
//!
//! Each dispatched draft becomes one spawned write. The caller never waits
//! and never sees the outcome; failures are logged and counted through
//! [`NotificationMetrics`]. The spawned task keeps the dispatching request's
//! trace id so its log lines correlate with the request that caused them.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use mockable::Clock;
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tracing::{debug, warn};

use crate::domain::ports::{NotificationDispatcher, NotificationMetrics, NotificationRepository};
use crate::domain::{Notification, NotificationDraft, NotificationId, NotificationKind, TraceId};

#[derive(Default)]
struct InFlight {
    count: AtomicUsize,
    idle: Notify,
}

struct InFlightGuard(Arc<InFlight>);

impl InFlightGuard {
    fn enter(in_flight: &Arc<InFlight>) -> Self {
        in_flight.count.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(in_flight))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.0.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.0.idle.notify_waiters();
        }
    }
}

/// Dispatcher that writes each notification in its own runtime task.
///
/// The store and metrics parameters may be trait objects, letting the server
/// pick adapters at runtime.
pub struct BackgroundNotificationDispatcher<N: ?Sized, M: ?Sized> {
    notifications: Arc<N>,
    metrics: Arc<M>,
    clock: Arc<dyn Clock>,
    in_flight: Arc<InFlight>,
}

impl<N: ?Sized, M: ?Sized> BackgroundNotificationDispatcher<N, M> {
    /// Create a dispatcher writing to `notifications`.
    pub fn new(notifications: Arc<N>, metrics: Arc<M>, clock: Arc<dyn Clock>) -> Self {
        Self {
            notifications,
            metrics,
            clock,
            in_flight: Arc::new(InFlight::default()),
        }
    }

    /// Number of deliveries still running.
    pub fn pending(&self) -> usize {
        self.in_flight.count.load(Ordering::SeqCst)
    }

    /// Resolve once every delivery dispatched so far has finished.
    pub async fn wait_idle(&self) {
        loop {
            let idle = self.in_flight.idle.notified();
            if self.pending() == 0 {
                return;
            }
            idle.await;
        }
    }
}

async fn deliver<N, M>(notifications: &N, metrics: &M, notification: Notification)
where
    N: NotificationRepository + ?Sized,
    M: NotificationMetrics + ?Sized,
{
    let kind: NotificationKind = notification.kind;
    match notifications.insert(&notification).await {
        Ok(()) => {
            debug!(notification_id = %notification.id, user_id = %notification.user_id, %kind, "notification delivered");
            if let Err(error) = metrics.record_delivered(kind).await {
                debug!(%error, "failed to record notification delivery");
            }
        }
        Err(error) => {
            warn!(
                notification_id = %notification.id,
                user_id = %notification.user_id,
                %kind,
                %error,
                "notification dropped"
            );
            if let Err(metrics_error) = metrics.record_dropped(kind).await {
                debug!(error = %metrics_error, "failed to record dropped notification");
            }
        }
    }
}

impl<N, M> NotificationDispatcher for BackgroundNotificationDispatcher<N, M>
where
    N: NotificationRepository + ?Sized + 'static,
    M: NotificationMetrics + ?Sized + 'static,
{
    fn dispatch(&self, draft: NotificationDraft) {
        let notification = Notification::from_draft(NotificationId::random(), draft, self.clock.utc());
        let Ok(runtime) = Handle::try_current() else {
            warn!(notification_id = %notification.id, "no runtime available; notification dropped");
            return;
        };

        let guard = InFlightGuard::enter(&self.in_flight);
        let notifications = Arc::clone(&self.notifications);
        let metrics = Arc::clone(&self.metrics);
        runtime.spawn(TraceId::inherit(TraceId::current(), async move {
            let _guard = guard;
            deliver(notifications.as_ref(), metrics.as_ref(), notification).await;
        }));
    }
}

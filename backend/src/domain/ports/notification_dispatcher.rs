//! Port for best-effort notification delivery.

use crate::domain::NotificationDraft;

/// Hands a notification off for delivery without waiting for the write.
///
/// Delivery is attempted at most once. Failures never reach the caller; they
/// are logged and counted by the implementation.
#[cfg_attr(test, mockall::automock)]
pub trait NotificationDispatcher: Send + Sync {
    /// Schedule delivery of `draft`.
    fn dispatch(&self, draft: NotificationDraft);
}

//! Driving port for a user's notification inbox.

use async_trait::async_trait;
use pagination::Page;

use crate::domain::{
    Error, NotificationAction, NotificationDetails, NotificationDraft, NotificationId,
    NotificationListQuery, NotificationScope, User,
};

/// A page of notifications plus the caller's unread total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationListing {
    pub page: Page<NotificationDetails>,
    /// Unread count across the whole inbox, independent of filters and paging.
    pub unread_count: u64,
}

/// What an update action did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationUpdateOutcome {
    /// The read flag changed on one notification.
    Updated(NotificationDetails),
    /// One notification was deleted.
    Deleted,
    /// Every unread notification was marked read.
    AllMarkedRead { updated_count: u64 },
}

/// Notification inbox operations exposed to inbound adapters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Page the caller's notifications with related records populated.
    async fn list(&self, query: NotificationListQuery) -> Result<NotificationListing, Error>;

    /// Store a notification directly.
    async fn create(&self, draft: NotificationDraft) -> Result<NotificationDetails, Error>;

    /// Apply `action` for `user`. Every action except mark-all-read needs a
    /// notification id owned by the caller.
    async fn update(
        &self,
        user: &User,
        notification_id: Option<NotificationId>,
        action: NotificationAction,
    ) -> Result<NotificationUpdateOutcome, Error>;

    /// Delete the caller's notifications inside `scope`; returns the count.
    async fn delete_bulk(&self, user: &User, scope: NotificationScope) -> Result<u64, Error>;
}

//! Port for notification persistence.
//!
//! Every mutation is scoped by owner; adapters never touch a notification
//! that belongs to a different user.

use async_trait::async_trait;
use pagination::Page;

use crate::domain::{
    Notification, NotificationId, NotificationListQuery, NotificationScope, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by notification repository adapters.
    pub enum NotificationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "notification repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "notification repository query failed: {message}",
    }
}

/// Port for storing and mutating user notifications.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Persist a new notification.
    async fn insert(&self, notification: &Notification) -> Result<(), NotificationRepositoryError>;

    /// Page a user's notifications, newest first.
    async fn list_for_user(
        &self,
        query: &NotificationListQuery,
    ) -> Result<Page<Notification>, NotificationRepositoryError>;

    /// Count the user's unread notifications.
    async fn count_unread(&self, user_id: &UserId) -> Result<u64, NotificationRepositoryError>;

    /// Set the read flag on a notification the user owns and return it.
    async fn set_read(
        &self,
        id: &NotificationId,
        owner: &UserId,
        read: bool,
    ) -> Result<Option<Notification>, NotificationRepositoryError>;

    /// Delete a notification the user owns. Returns `false` when nothing
    /// matched.
    async fn delete(
        &self,
        id: &NotificationId,
        owner: &UserId,
    ) -> Result<bool, NotificationRepositoryError>;

    /// Mark every unread notification of the user read; returns how many
    /// changed.
    async fn mark_all_read(&self, owner: &UserId) -> Result<u64, NotificationRepositoryError>;

    /// Delete the user's notifications inside `scope`; returns how many were
    /// removed.
    async fn delete_matching(
        &self,
        owner: &UserId,
        scope: NotificationScope,
    ) -> Result<u64, NotificationRepositoryError>;
}

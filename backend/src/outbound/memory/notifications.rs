//! In-memory `NotificationRepository`.

use async_trait::async_trait;
use pagination::Page;

use crate::domain::ports::{NotificationRepository, NotificationRepositoryError};
use crate::domain::{
    Notification, NotificationId, NotificationListQuery, NotificationScope, UserId,
};

use super::{MemoryStore, paginate};

/// Notifications held in a [`MemoryStore`].
#[derive(Clone)]
pub struct MemoryNotificationRepository {
    store: MemoryStore,
}

impl MemoryNotificationRepository {
    /// View over `store`.
    pub fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl NotificationRepository for MemoryNotificationRepository {
    async fn insert(&self, notification: &Notification) -> Result<(), NotificationRepositoryError> {
        let mut tables = self
            .store
            .lock()
            .map_err(NotificationRepositoryError::query)?;
        tables
            .notifications
            .insert(notification.id, notification.clone());
        Ok(())
    }

    async fn list_for_user(
        &self,
        query: &NotificationListQuery,
    ) -> Result<Page<Notification>, NotificationRepositoryError> {
        let tables = self
            .store
            .lock()
            .map_err(NotificationRepositoryError::query)?;
        let mut matches: Vec<Notification> = tables
            .notifications
            .values()
            .filter(|notification| query.admits(notification))
            .cloned()
            .collect();
        drop(tables);
        matches.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(paginate(matches, query.page))
    }

    async fn count_unread(&self, user_id: &UserId) -> Result<u64, NotificationRepositoryError> {
        let tables = self
            .store
            .lock()
            .map_err(NotificationRepositoryError::query)?;
        Ok(tables
            .notifications
            .values()
            .filter(|n| &n.user_id == user_id && !n.read)
            .count() as u64)
    }

    async fn set_read(
        &self,
        id: &NotificationId,
        owner: &UserId,
        read: bool,
    ) -> Result<Option<Notification>, NotificationRepositoryError> {
        let mut tables = self
            .store
            .lock()
            .map_err(NotificationRepositoryError::query)?;
        Ok(tables
            .notifications
            .get_mut(id)
            .filter(|n| &n.user_id == owner)
            .map(|n| {
                n.read = read;
                n.clone()
            }))
    }

    async fn delete(
        &self,
        id: &NotificationId,
        owner: &UserId,
    ) -> Result<bool, NotificationRepositoryError> {
        let mut tables = self
            .store
            .lock()
            .map_err(NotificationRepositoryError::query)?;
        let owned = tables
            .notifications
            .get(id)
            .is_some_and(|n| &n.user_id == owner);
        if owned {
            tables.notifications.remove(id);
        }
        Ok(owned)
    }

    async fn mark_all_read(&self, owner: &UserId) -> Result<u64, NotificationRepositoryError> {
        let mut tables = self
            .store
            .lock()
            .map_err(NotificationRepositoryError::query)?;
        let mut updated = 0;
        for n in tables.notifications.values_mut() {
            if &n.user_id == owner && !n.read {
                n.read = true;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn delete_matching(
        &self,
        owner: &UserId,
        scope: NotificationScope,
    ) -> Result<u64, NotificationRepositoryError> {
        let mut tables = self
            .store
            .lock()
            .map_err(NotificationRepositoryError::query)?;
        let before = tables.notifications.len();
        tables
            .notifications
            .retain(|_, n| !(&n.user_id == owner && scope.includes(n)));
        Ok((before - tables.notifications.len()) as u64)
    }
}

//! PostgreSQL-backed `NotificationRepository`.
//!
//! Every statement filters on `user_id`, so a caller can only ever touch
//! their own rows.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::AsyncConnection as _;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use pagination::Page;
use uuid::Uuid;

use crate::domain::ports::{NotificationRepository, NotificationRepositoryError};
use crate::domain::{
    AnswerId, Notification, NotificationId, NotificationKind, NotificationListQuery,
    NotificationMessage, NotificationScope, QuestionId, UserId,
};

use super::diesel_helpers::{count_to_u64, map_diesel_error, map_pool_error, page_window};
use super::models::{NewNotificationRow, NotificationRow};
use super::pool::{DbPool, PoolError};
use super::schema::notifications;

/// Diesel implementation of [`NotificationRepository`].
#[derive(Clone)]
pub struct DieselNotificationRepository {
    pool: DbPool,
}

impl DieselNotificationRepository {
    /// Repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> NotificationRepositoryError {
    map_pool_error(error, NotificationRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> NotificationRepositoryError {
    map_diesel_error(
        error,
        NotificationRepositoryError::query,
        NotificationRepositoryError::connection,
    )
}

fn row_to_notification(row: NotificationRow) -> Result<Notification, NotificationRepositoryError> {
    let invalid = |err: crate::domain::NotificationValidationError| {
        NotificationRepositoryError::query(format!("stored notification {}: {err}", row.id))
    };
    Ok(Notification {
        id: NotificationId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        kind: row.kind.parse::<NotificationKind>().map_err(invalid)?,
        message: NotificationMessage::new(&row.message).map_err(invalid)?,
        read: row.read,
        related_question_id: row.related_question_id.map(QuestionId::from_uuid),
        related_answer_id: row.related_answer_id.map(AnswerId::from_uuid),
        created_at: row.created_at,
    })
}

fn listed(user_id: Uuid, unread_only: bool) -> notifications::BoxedQuery<'static, Pg> {
    let statement = notifications::table
        .filter(notifications::user_id.eq(user_id))
        .into_boxed();
    if unread_only {
        statement.filter(notifications::read.eq(false))
    } else {
        statement
    }
}

#[async_trait]
impl NotificationRepository for DieselNotificationRepository {
    async fn insert(&self, notification: &Notification) -> Result<(), NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let row = NewNotificationRow {
            id: *notification.id.as_uuid(),
            user_id: *notification.user_id.as_uuid(),
            kind: notification.kind.as_str(),
            message: notification.message.as_ref(),
            read: notification.read,
            related_question_id: notification.related_question_id.map(|id| *id.as_uuid()),
            related_answer_id: notification.related_answer_id.map(|id| *id.as_uuid()),
            created_at: notification.created_at,
        };
        diesel::insert_into(notifications::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(())
    }

    async fn list_for_user(
        &self,
        query: &NotificationListQuery,
    ) -> Result<Page<Notification>, NotificationRepositoryError> {
        let user_id = *query.user_id.as_uuid();
        let unread_only = query.unread_only;
        let (limit, offset) = page_window(query.page);
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let (total, rows) = conn
            .transaction(|conn| {
                async move {
                    let total: i64 = listed(user_id, unread_only)
                        .count()
                        .get_result(conn)
                        .await?;
                    let rows: Vec<NotificationRow> = listed(user_id, unread_only)
                        .order_by((notifications::created_at.desc(), notifications::id.desc()))
                        .select(NotificationRow::as_select())
                        .limit(limit)
                        .offset(offset)
                        .load(conn)
                        .await?;
                    Ok((total, rows))
                }
                .scope_boxed()
            })
            .await
            .map_err(diesel_error)?;

        let items = rows
            .into_iter()
            .map(row_to_notification)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, query.page, count_to_u64(total)))
    }

    async fn count_unread(&self, user_id: &UserId) -> Result<u64, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let count: i64 = listed(*user_id.as_uuid(), true)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(diesel_error)?;
        Ok(count_to_u64(count))
    }

    async fn set_read(
        &self,
        id: &NotificationId,
        owner: &UserId,
        read: bool,
    ) -> Result<Option<Notification>, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        diesel::update(
            notifications::table
                .filter(notifications::id.eq(*id.as_uuid()))
                .filter(notifications::user_id.eq(*owner.as_uuid())),
        )
        .set(notifications::read.eq(read))
        .returning(NotificationRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(diesel_error)?
        .map(row_to_notification)
        .transpose()
    }

    async fn delete(
        &self,
        id: &NotificationId,
        owner: &UserId,
    ) -> Result<bool, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let deleted = diesel::delete(
            notifications::table
                .filter(notifications::id.eq(*id.as_uuid()))
                .filter(notifications::user_id.eq(*owner.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(diesel_error)?;
        Ok(deleted > 0)
    }

    async fn mark_all_read(&self, owner: &UserId) -> Result<u64, NotificationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let updated = diesel::update(
            notifications::table
                .filter(notifications::user_id.eq(*owner.as_uuid()))
                .filter(notifications::read.eq(false)),
        )
        .set(notifications::read.eq(true))
        .execute(&mut conn)
        .await
        .map_err(diesel_error)?;
        Ok(updated as u64)
    }

    async fn delete_matching(
        &self,
        owner: &UserId,
        scope: NotificationScope,
    ) -> Result<u64, NotificationRepositoryError> {
        let owned = notifications::table.filter(notifications::user_id.eq(*owner.as_uuid()));
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let deleted = match scope {
            NotificationScope::All => diesel::delete(owned).execute(&mut conn).await,
            NotificationScope::Read => {
                diesel::delete(owned.filter(notifications::read.eq(true)))
                    .execute(&mut conn)
                    .await
            }
        }
        .map_err(diesel_error)?;
        Ok(deleted as u64)
    }
}

//! Notification inbox service.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::Page;
use tracing::info;

use crate::domain::answer_service::map_answer_repository_error;
use crate::domain::ports::{
    AnswerRepository, NotificationListing, NotificationRepository, NotificationRepositoryError,
    NotificationService, NotificationUpdateOutcome, QuestionRepository,
};
use crate::domain::question_service::map_question_repository_error;
use crate::domain::{
    AnswerId, Error, Notification, NotificationAction, NotificationDetails, NotificationDraft,
    NotificationId, NotificationListQuery, NotificationScope, QuestionId, RelatedAnswer,
    RelatedQuestion, User,
};

const NOTIFICATION_NOT_FOUND: &str = "Notification not found";

pub(crate) fn map_notification_repository_error(error: NotificationRepositoryError) -> Error {
    match error {
        NotificationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("notification repository unavailable: {message}"))
        }
        NotificationRepositoryError::Query { message } => {
            Error::internal(format!("notification repository error: {message}"))
        }
    }
}

fn unique<T: PartialEq + Copy>(ids: impl Iterator<Item = T>) -> Vec<T> {
    let mut out = Vec::new();
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

/// Notification service implementing the [`NotificationService`] driving port.
#[derive(Clone)]
pub struct NotificationServiceImpl<N, Q, A> {
    notifications: Arc<N>,
    questions: Arc<Q>,
    answers: Arc<A>,
    clock: Arc<dyn Clock>,
}

impl<N, Q, A> NotificationServiceImpl<N, Q, A> {
    /// Create a service over the notification store and the stores it
    /// populates references from.
    pub fn new(
        notifications: Arc<N>,
        questions: Arc<Q>,
        answers: Arc<A>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            notifications,
            questions,
            answers,
            clock,
        }
    }
}

impl<N, Q, A> NotificationServiceImpl<N, Q, A>
where
    Q: QuestionRepository,
    A: AnswerRepository,
{
    /// Attach question titles and answer bodies with one lookup per store.
    async fn populate(
        &self,
        notifications: Vec<Notification>,
    ) -> Result<Vec<NotificationDetails>, Error> {
        let question_ids: Vec<QuestionId> =
            unique(notifications.iter().filter_map(|n| n.related_question_id));
        let answer_ids: Vec<AnswerId> =
            unique(notifications.iter().filter_map(|n| n.related_answer_id));

        let titles: HashMap<QuestionId, String> = if question_ids.is_empty() {
            HashMap::new()
        } else {
            self.questions
                .find_by_ids(&question_ids)
                .await
                .map_err(map_question_repository_error)?
                .into_iter()
                .map(|question| (question.id, question.title.as_ref().to_owned()))
                .collect()
        };
        let bodies: HashMap<AnswerId, String> = if answer_ids.is_empty() {
            HashMap::new()
        } else {
            self.answers
                .find_by_ids(&answer_ids)
                .await
                .map_err(map_answer_repository_error)?
                .into_iter()
                .map(|answer| (answer.id, answer.content.as_ref().to_owned()))
                .collect()
        };

        Ok(notifications
            .into_iter()
            .map(|notification| {
                let related_question = notification.related_question_id.and_then(|id| {
                    titles.get(&id).map(|title| RelatedQuestion {
                        id,
                        title: title.clone(),
                    })
                });
                let related_answer = notification.related_answer_id.and_then(|id| {
                    bodies.get(&id).map(|content| RelatedAnswer {
                        id,
                        content: content.clone(),
                    })
                });
                NotificationDetails {
                    notification,
                    related_question,
                    related_answer,
                }
            })
            .collect())
    }

    async fn populate_one(&self, notification: Notification) -> Result<NotificationDetails, Error> {
        let mut populated = self.populate(vec![notification]).await?;
        populated
            .pop()
            .ok_or_else(|| Error::internal("notification population dropped a record"))
    }
}

#[async_trait]
impl<N, Q, A> NotificationService for NotificationServiceImpl<N, Q, A>
where
    N: NotificationRepository,
    Q: QuestionRepository,
    A: AnswerRepository,
{
    async fn list(&self, query: NotificationListQuery) -> Result<NotificationListing, Error> {
        let page = self
            .notifications
            .list_for_user(&query)
            .await
            .map_err(map_notification_repository_error)?;
        let unread_count = self
            .notifications
            .count_unread(&query.user_id)
            .await
            .map_err(map_notification_repository_error)?;
        let info = page.info;
        let items = self.populate(page.items).await?;
        Ok(NotificationListing {
            page: Page { items, info },
            unread_count,
        })
    }

    async fn create(&self, draft: NotificationDraft) -> Result<NotificationDetails, Error> {
        let notification = Notification::from_draft(NotificationId::random(), draft, self.clock.utc());
        self.notifications
            .insert(&notification)
            .await
            .map_err(map_notification_repository_error)?;
        self.populate_one(notification).await
    }

    async fn update(
        &self,
        user: &User,
        notification_id: Option<NotificationId>,
        action: NotificationAction,
    ) -> Result<NotificationUpdateOutcome, Error> {
        let owner = user.id();
        match (action, notification_id) {
            (NotificationAction::MarkAllRead, _) => {
                let updated_count = self
                    .notifications
                    .mark_all_read(owner)
                    .await
                    .map_err(map_notification_repository_error)?;
                info!(user_id = %owner, updated_count, "notifications marked read");
                Ok(NotificationUpdateOutcome::AllMarkedRead { updated_count })
            }
            (NotificationAction::Delete, Some(id)) => {
                let deleted = self
                    .notifications
                    .delete(&id, owner)
                    .await
                    .map_err(map_notification_repository_error)?;
                if deleted {
                    Ok(NotificationUpdateOutcome::Deleted)
                } else {
                    Err(Error::not_found(NOTIFICATION_NOT_FOUND))
                }
            }
            (NotificationAction::MarkRead | NotificationAction::MarkUnread, Some(id)) => {
                let read = action == NotificationAction::MarkRead;
                let notification = self
                    .notifications
                    .set_read(&id, owner, read)
                    .await
                    .map_err(map_notification_repository_error)?
                    .ok_or_else(|| Error::not_found(NOTIFICATION_NOT_FOUND))?;
                Ok(NotificationUpdateOutcome::Updated(
                    self.populate_one(notification).await?,
                ))
            }
            (_, None) => Err(Error::invalid_request("Notification ID is required")),
        }
    }

    async fn delete_bulk(&self, user: &User, scope: NotificationScope) -> Result<u64, Error> {
        let deleted = self
            .notifications
            .delete_matching(user.id(), scope)
            .await
            .map_err(map_notification_repository_error)?;
        info!(user_id = %user.id(), deleted, ?scope, "notifications deleted");
        Ok(deleted)
    }
}

#[cfg(test)]
#[path = "notification_service_tests.rs"]
mod tests;

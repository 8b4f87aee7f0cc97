//! Repository doubles that fail on demand and delegate everything else to the
//! in-memory adapters.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use forum_backend::domain::ports::{
    NotificationRepository, NotificationRepositoryError, QuestionRepository,
    QuestionRepositoryError,
};
use forum_backend::domain::{
    AnswerId, Notification, NotificationId, NotificationListQuery, NotificationScope, Question,
    QuestionId, QuestionListQuery, UserId,
};
use forum_backend::outbound::memory::{MemoryNotificationRepository, MemoryQuestionRepository};
use pagination::Page;

/// Question store whose back-reference append fails a set number of times.
pub struct FlakyQuestions {
    inner: MemoryQuestionRepository,
    remaining_failures: AtomicUsize,
    append_calls: AtomicUsize,
}

impl FlakyQuestions {
    pub fn new(inner: MemoryQuestionRepository) -> Self {
        Self {
            inner,
            remaining_failures: AtomicUsize::new(0),
            append_calls: AtomicUsize::new(0),
        }
    }

    /// Fail the next `count` appends.
    pub fn fail_next_appends(&self, count: usize) {
        self.remaining_failures.store(count, Ordering::SeqCst);
    }

    pub fn append_calls(&self) -> usize {
        self.append_calls.load(Ordering::SeqCst)
    }

    fn take_failure(&self) -> bool {
        self.remaining_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl QuestionRepository for FlakyQuestions {
    async fn insert(&self, question: &Question) -> Result<(), QuestionRepositoryError> {
        self.inner.insert(question).await
    }

    async fn find_by_id(
        &self,
        id: &QuestionId,
    ) -> Result<Option<Question>, QuestionRepositoryError> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_ids(
        &self,
        ids: &[QuestionId],
    ) -> Result<Vec<Question>, QuestionRepositoryError> {
        self.inner.find_by_ids(ids).await
    }

    async fn list(
        &self,
        query: &QuestionListQuery,
    ) -> Result<Page<Question>, QuestionRepositoryError> {
        self.inner.list(query).await
    }

    async fn record_view(
        &self,
        id: &QuestionId,
    ) -> Result<Option<Question>, QuestionRepositoryError> {
        self.inner.record_view(id).await
    }

    async fn append_answer(
        &self,
        id: &QuestionId,
        answer_id: &AnswerId,
        at: DateTime<Utc>,
    ) -> Result<bool, QuestionRepositoryError> {
        self.append_calls.fetch_add(1, Ordering::SeqCst);
        if self.take_failure() {
            return Err(QuestionRepositoryError::query("injected append failure"));
        }
        self.inner.append_answer(id, answer_id, at).await
    }

    async fn close(
        &self,
        id: &QuestionId,
        at: DateTime<Utc>,
    ) -> Result<Option<Question>, QuestionRepositoryError> {
        self.inner.close(id, at).await
    }

    async fn set_accepted_answer(
        &self,
        id: &QuestionId,
        answer_id: &AnswerId,
        at: DateTime<Utc>,
    ) -> Result<Option<Question>, QuestionRepositoryError> {
        self.inner.set_accepted_answer(id, answer_id, at).await
    }
}

/// Notification store that refuses every insert.
pub struct RefusingNotifications {
    inner: MemoryNotificationRepository,
    attempts: AtomicUsize,
}

impl RefusingNotifications {
    pub fn new(inner: MemoryNotificationRepository) -> Self {
        Self {
            inner,
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationRepository for RefusingNotifications {
    async fn insert(&self, _notification: &Notification) -> Result<(), NotificationRepositoryError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(NotificationRepositoryError::query("injected insert failure"))
    }

    async fn list_for_user(
        &self,
        query: &NotificationListQuery,
    ) -> Result<Page<Notification>, NotificationRepositoryError> {
        self.inner.list_for_user(query).await
    }

    async fn count_unread(&self, user_id: &UserId) -> Result<u64, NotificationRepositoryError> {
        self.inner.count_unread(user_id).await
    }

    async fn set_read(
        &self,
        id: &NotificationId,
        owner: &UserId,
        read: bool,
    ) -> Result<Option<Notification>, NotificationRepositoryError> {
        self.inner.set_read(id, owner, read).await
    }

    async fn delete(
        &self,
        id: &NotificationId,
        owner: &UserId,
    ) -> Result<bool, NotificationRepositoryError> {
        self.inner.delete(id, owner).await
    }

    async fn mark_all_read(&self, owner: &UserId) -> Result<u64, NotificationRepositoryError> {
        self.inner.mark_all_read(owner).await
    }

    async fn delete_matching(
        &self,
        owner: &UserId,
        scope: NotificationScope,
    ) -> Result<u64, NotificationRepositoryError> {
        self.inner.delete_matching(owner, scope).await
    }
}

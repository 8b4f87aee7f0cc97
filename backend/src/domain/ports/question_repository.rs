//! Port for question persistence.
//!
//! Counter and back-reference mutations are single atomic operations in every
//! adapter, so concurrent callers never lose each other's updates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::Page;

use crate::domain::{AnswerId, Question, QuestionId, QuestionListQuery};

use super::define_port_error;

define_port_error! {
    /// Errors raised by question repository adapters.
    pub enum QuestionRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "question repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "question repository query failed: {message}",
    }
}

/// Port for storing questions and mutating their counters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Persist a new question.
    async fn insert(&self, question: &Question) -> Result<(), QuestionRepositoryError>;

    /// Fetch a question without side effects.
    async fn find_by_id(&self, id: &QuestionId)
    -> Result<Option<Question>, QuestionRepositoryError>;

    /// Fetch every question in `ids` that exists, in no particular order.
    async fn find_by_ids(&self, ids: &[QuestionId])
    -> Result<Vec<Question>, QuestionRepositoryError>;

    /// Filter, order and page questions. The page total counts every match.
    async fn list(&self, query: &QuestionListQuery)
    -> Result<Page<Question>, QuestionRepositoryError>;

    /// Increment the view counter by one and return the record as it stood
    /// before the increment.
    async fn record_view(&self, id: &QuestionId)
    -> Result<Option<Question>, QuestionRepositoryError>;

    /// Append `answer_id` to the question's answer list unless already
    /// present, refreshing `updated_at`. Returns `false` when the question
    /// does not exist.
    async fn append_answer(
        &self,
        id: &QuestionId,
        answer_id: &AnswerId,
        at: DateTime<Utc>,
    ) -> Result<bool, QuestionRepositoryError>;

    /// Set the closed flag and return the updated record.
    async fn close(
        &self,
        id: &QuestionId,
        at: DateTime<Utc>,
    ) -> Result<Option<Question>, QuestionRepositoryError>;

    /// Record `answer_id` as the accepted answer and return the updated record.
    async fn set_accepted_answer(
        &self,
        id: &QuestionId,
        answer_id: &AnswerId,
        at: DateTime<Utc>,
    ) -> Result<Option<Question>, QuestionRepositoryError>;
}

//! Port for answer persistence.

use async_trait::async_trait;
use pagination::Page;

use crate::domain::{Answer, AnswerId, AnswerListQuery, QuestionId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by answer repository adapters.
    pub enum AnswerRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "answer repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "answer repository query failed: {message}",
    }
}

/// Port for storing answers and applying votes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnswerRepository: Send + Sync {
    /// Persist a new answer.
    async fn insert(&self, answer: &Answer) -> Result<(), AnswerRepositoryError>;

    /// Fetch an answer by identifier.
    async fn find_by_id(&self, id: &AnswerId) -> Result<Option<Answer>, AnswerRepositoryError>;

    /// Fetch every answer in `ids` that exists, in no particular order.
    async fn find_by_ids(&self, ids: &[AnswerId]) -> Result<Vec<Answer>, AnswerRepositoryError>;

    /// Order and page the answers of one question.
    async fn list_for_question(
        &self,
        query: &AnswerListQuery,
    ) -> Result<Page<Answer>, AnswerRepositoryError>;

    /// Atomically add `delta` to the vote counter and return the updated
    /// answer.
    async fn apply_vote(
        &self,
        id: &AnswerId,
        delta: i64,
    ) -> Result<Option<Answer>, AnswerRepositoryError>;

    /// Mark `id` accepted and clear the flag on every other answer of
    /// `question_id`. Returns the updated answer.
    async fn mark_accepted(
        &self,
        question_id: &QuestionId,
        id: &AnswerId,
    ) -> Result<Option<Answer>, AnswerRepositoryError>;

    /// Answers whose question exists but does not list them, oldest first.
    async fn find_unlinked(&self, limit: u32) -> Result<Vec<Answer>, AnswerRepositoryError>;
}

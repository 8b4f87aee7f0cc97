//! Driving port for question operations.

use async_trait::async_trait;
use pagination::Page;

use crate::domain::{Error, QuestionDetails, QuestionDraft, QuestionId, QuestionListQuery, User};

/// Question operations exposed to inbound adapters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionService: Send + Sync {
    /// Persist a new question owned by `author`.
    async fn create(&self, author: &User, draft: QuestionDraft) -> Result<QuestionDetails, Error>;

    /// Filter, order and page questions with authors populated.
    async fn list(&self, query: QuestionListQuery) -> Result<Page<QuestionDetails>, Error>;

    /// Fetch one question, counting the fetch as a view.
    ///
    /// The returned record already includes this call's increment.
    async fn get_by_id(&self, id: QuestionId) -> Result<QuestionDetails, Error>;

    /// Close a question to new answers and votes. Only the author or an admin
    /// may do this; closing twice is a no-op.
    async fn close(&self, actor: &User, id: QuestionId) -> Result<QuestionDetails, Error>;
}

//! Driving port for answer operations.

use async_trait::async_trait;
use pagination::Page;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{AnswerContent, AnswerDetails, AnswerId, AnswerListQuery, Error, QuestionId, User};

/// Outcome of a back-reference repair pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    /// Answers found missing from their question's list.
    pub unlinked: u64,
    /// Answers successfully re-appended.
    pub relinked: u64,
    /// Answers whose repair failed and remain unlinked.
    pub failed: u64,
}

/// Answer operations exposed to inbound adapters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnswerService: Send + Sync {
    /// Post an answer to an open question and link it from the question.
    async fn create(
        &self,
        owner: &User,
        question_id: QuestionId,
        content: AnswerContent,
    ) -> Result<AnswerDetails, Error>;

    /// Order and page a question's answers with owners populated.
    async fn list(&self, query: AnswerListQuery) -> Result<Page<AnswerDetails>, Error>;

    /// Mark an answer accepted. Only the question's author may do this.
    async fn accept(&self, actor: &User, answer_id: AnswerId) -> Result<AnswerDetails, Error>;

    /// Re-append answers that are missing from their question's answer list.
    async fn reconcile_links(&self) -> Result<ReconciliationReport, Error>;
}

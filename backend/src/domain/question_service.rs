//! Question service: posting, listing, viewing and closing questions.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::Page;
use tracing::info;

use crate::domain::populate::{user_summaries, user_summary};
use crate::domain::ports::{
    QuestionRepository, QuestionRepositoryError, QuestionService, UserRepository,
};
use crate::domain::{
    Error, Question, QuestionDetails, QuestionDraft, QuestionId, QuestionListQuery, User,
};

pub(crate) const QUESTION_NOT_FOUND: &str = "Question not found";

pub(crate) fn map_question_repository_error(error: QuestionRepositoryError) -> Error {
    match error {
        QuestionRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("question repository unavailable: {message}"))
        }
        QuestionRepositoryError::Query { message } => {
            Error::internal(format!("question repository error: {message}"))
        }
    }
}

/// Question service implementing the [`QuestionService`] driving port.
#[derive(Clone)]
pub struct QuestionServiceImpl<Q, U> {
    questions: Arc<Q>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<Q, U> QuestionServiceImpl<Q, U> {
    /// Create a service over the question and user stores.
    pub fn new(questions: Arc<Q>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            questions,
            users,
            clock,
        }
    }
}

impl<Q, U> QuestionServiceImpl<Q, U>
where
    U: UserRepository,
{
    async fn with_author(&self, question: Question) -> Result<QuestionDetails, Error> {
        let author = user_summary(self.users.as_ref(), &question.author_id).await?;
        Ok(QuestionDetails { question, author })
    }
}

#[async_trait]
impl<Q, U> QuestionService for QuestionServiceImpl<Q, U>
where
    Q: QuestionRepository,
    U: UserRepository,
{
    async fn create(&self, author: &User, draft: QuestionDraft) -> Result<QuestionDetails, Error> {
        let question = Question::create(
            QuestionId::random(),
            draft,
            author.id().clone(),
            self.clock.utc(),
        );
        self.questions
            .insert(&question)
            .await
            .map_err(map_question_repository_error)?;
        info!(question_id = %question.id, author_id = %author.id(), "question created");
        Ok(QuestionDetails {
            question,
            author: Some(author.summary()),
        })
    }

    async fn list(&self, query: QuestionListQuery) -> Result<Page<QuestionDetails>, Error> {
        let page = self
            .questions
            .list(&query)
            .await
            .map_err(map_question_repository_error)?;
        let authors = user_summaries(
            self.users.as_ref(),
            page.items.iter().map(|question| question.author_id.clone()),
        )
        .await?;
        Ok(page.map(|question| {
            let author = authors.get(&question.author_id).cloned();
            QuestionDetails { question, author }
        }))
    }

    async fn get_by_id(&self, id: QuestionId) -> Result<QuestionDetails, Error> {
        let question = self
            .questions
            .record_view(&id)
            .await
            .map_err(map_question_repository_error)?
            .ok_or_else(|| Error::not_found(QUESTION_NOT_FOUND))?;
        self.with_author(question).await
    }

    async fn close(&self, actor: &User, id: QuestionId) -> Result<QuestionDetails, Error> {
        let question = self
            .questions
            .find_by_id(&id)
            .await
            .map_err(map_question_repository_error)?
            .ok_or_else(|| Error::not_found(QUESTION_NOT_FOUND))?;
        if &question.author_id != actor.id() && !actor.role().is_admin() {
            return Err(Error::forbidden(
                "Only the question author or an admin can close this question",
            ));
        }
        if question.is_closed {
            return self.with_author(question).await;
        }

        let closed = self
            .questions
            .close(&id, self.clock.utc())
            .await
            .map_err(map_question_repository_error)?
            .ok_or_else(|| Error::not_found(QUESTION_NOT_FOUND))?;
        info!(question_id = %id, actor_id = %actor.id(), "question closed");
        self.with_author(closed).await
    }
}

#[cfg(test)]
#[path = "question_service_tests.rs"]
mod tests;

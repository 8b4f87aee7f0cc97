//! Answer service: posting, listing and accepting answers.
//!
//! An answer is written before its question's back-reference list is
//! updated. The second write is retried a bounded number of times; answers
//! left behind by a failed retry are picked up by
//! [`AnswerService::reconcile_links`].

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::Page;
use tracing::{error, info, warn};

use crate::domain::populate::{user_summaries, user_summary};
use crate::domain::ports::{
    AnswerRepository, AnswerRepositoryError, AnswerService, NotificationDispatcher,
    QuestionRepository, ReconciliationReport, UserRepository,
};
use crate::domain::question_service::{QUESTION_NOT_FOUND, map_question_repository_error};
use crate::domain::{
    Answer, AnswerContent, AnswerDetails, AnswerId, AnswerListQuery, Error, NotificationDraft,
    NotificationKind, NotificationMessage, QuestionId, User,
};

/// Attempts made to link a new answer from its question.
pub const LINK_ATTEMPTS: usize = 3;

const RECONCILE_BATCH: u32 = 100;

pub(crate) const ANSWER_NOT_FOUND: &str = "Answer not found";

pub(crate) fn map_answer_repository_error(error: AnswerRepositoryError) -> Error {
    match error {
        AnswerRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("answer repository unavailable: {message}"))
        }
        AnswerRepositoryError::Query { message } => {
            Error::internal(format!("answer repository error: {message}"))
        }
    }
}

/// Answer service implementing the [`AnswerService`] driving port.
#[derive(Clone)]
pub struct AnswerServiceImpl<A, Q, U, D> {
    answers: Arc<A>,
    questions: Arc<Q>,
    users: Arc<U>,
    notifications: Arc<D>,
    clock: Arc<dyn Clock>,
}

impl<A, Q, U, D> AnswerServiceImpl<A, Q, U, D> {
    /// Create a service over the answer, question and user stores.
    pub fn new(
        answers: Arc<A>,
        questions: Arc<Q>,
        users: Arc<U>,
        notifications: Arc<D>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            answers,
            questions,
            users,
            notifications,
            clock,
        }
    }
}

impl<A, Q, U, D> AnswerServiceImpl<A, Q, U, D>
where
    Q: QuestionRepository,
{
    /// Append the back-reference, retrying transient failures.
    async fn link(&self, question_id: &QuestionId, answer_id: &AnswerId) -> Result<bool, Error> {
        let mut attempt = 1;
        loop {
            match self
                .questions
                .append_answer(question_id, answer_id, self.clock.utc())
                .await
            {
                Ok(linked) => return Ok(linked),
                Err(err) if attempt < LINK_ATTEMPTS => {
                    warn!(%question_id, %answer_id, attempt, error = %err, "answer link failed, retrying");
                    attempt += 1;
                }
                Err(err) => return Err(map_question_repository_error(err)),
            }
        }
    }
}

#[async_trait]
impl<A, Q, U, D> AnswerService for AnswerServiceImpl<A, Q, U, D>
where
    A: AnswerRepository,
    Q: QuestionRepository,
    U: UserRepository,
    D: NotificationDispatcher,
{
    async fn create(
        &self,
        owner: &User,
        question_id: QuestionId,
        content: AnswerContent,
    ) -> Result<AnswerDetails, Error> {
        let question = self
            .questions
            .find_by_id(&question_id)
            .await
            .map_err(map_question_repository_error)?
            .ok_or_else(|| Error::not_found(QUESTION_NOT_FOUND))?;
        if question.is_closed {
            return Err(Error::rejected("Cannot answer a closed question"));
        }

        let answer = Answer::create(
            AnswerId::random(),
            content,
            question_id,
            owner.id().clone(),
            self.clock.utc(),
        );
        self.answers
            .insert(&answer)
            .await
            .map_err(map_answer_repository_error)?;

        match self.link(&question_id, &answer.id).await {
            Ok(true) => {}
            Ok(false) => {
                error!(%question_id, answer_id = %answer.id, "question vanished before answer link");
                return Err(Error::internal("answer stored without question link"));
            }
            Err(err) => {
                error!(
                    %question_id,
                    answer_id = %answer.id,
                    attempts = LINK_ATTEMPTS,
                    error = %err,
                    "answer stored without question link"
                );
                return Err(err);
            }
        }

        info!(answer_id = %answer.id, %question_id, owner_id = %owner.id(), "answer created");
        Ok(AnswerDetails {
            answer,
            owner: Some(owner.summary()),
        })
    }

    async fn list(&self, query: AnswerListQuery) -> Result<Page<AnswerDetails>, Error> {
        self.questions
            .find_by_id(&query.question_id)
            .await
            .map_err(map_question_repository_error)?
            .ok_or_else(|| Error::not_found(QUESTION_NOT_FOUND))?;

        let page = self
            .answers
            .list_for_question(&query)
            .await
            .map_err(map_answer_repository_error)?;
        let owners = user_summaries(
            self.users.as_ref(),
            page.items.iter().map(|answer| answer.owner_id.clone()),
        )
        .await?;
        Ok(page.map(|answer| {
            let owner = owners.get(&answer.owner_id).cloned();
            AnswerDetails { answer, owner }
        }))
    }

    async fn accept(&self, actor: &User, answer_id: AnswerId) -> Result<AnswerDetails, Error> {
        let answer = self
            .answers
            .find_by_id(&answer_id)
            .await
            .map_err(map_answer_repository_error)?
            .ok_or_else(|| Error::not_found(ANSWER_NOT_FOUND))?;
        let question = self
            .questions
            .find_by_id(&answer.question_id)
            .await
            .map_err(map_question_repository_error)?
            .ok_or_else(|| Error::not_found(QUESTION_NOT_FOUND))?;
        if &question.author_id != actor.id() {
            return Err(Error::forbidden(
                "Only the question author can accept an answer",
            ));
        }

        let accepted = self
            .answers
            .mark_accepted(&question.id, &answer_id)
            .await
            .map_err(map_answer_repository_error)?
            .ok_or_else(|| Error::not_found(ANSWER_NOT_FOUND))?;
        self.questions
            .set_accepted_answer(&question.id, &answer_id, self.clock.utc())
            .await
            .map_err(map_question_repository_error)?
            .ok_or_else(|| Error::not_found(QUESTION_NOT_FOUND))?;
        info!(%answer_id, question_id = %question.id, "answer accepted");

        if !accepted.is_owned_by(actor.id()) {
            match NotificationMessage::new(&format!("{} accepted your answer", actor.name())) {
                Ok(message) => self.notifications.dispatch(NotificationDraft {
                    recipient: accepted.owner_id.clone(),
                    kind: NotificationKind::Answer,
                    message,
                    related_question: Some(question.id),
                    related_answer: Some(answer_id),
                }),
                Err(err) => warn!(error = %err, "acceptance notification skipped"),
            }
        }

        let owner = user_summary(self.users.as_ref(), &accepted.owner_id).await?;
        Ok(AnswerDetails {
            answer: accepted,
            owner,
        })
    }

    async fn reconcile_links(&self) -> Result<ReconciliationReport, Error> {
        let mut report = ReconciliationReport::default();
        let mut seen = HashSet::new();
        loop {
            let batch = self
                .answers
                .find_unlinked(RECONCILE_BATCH)
                .await
                .map_err(map_answer_repository_error)?;
            let fetched = batch.len();
            // Answers that failed to relink come back in later batches.
            let fresh: Vec<Answer> = batch
                .into_iter()
                .filter(|answer| seen.insert(answer.id))
                .collect();
            if fresh.is_empty() {
                break;
            }
            for answer in fresh {
                report.unlinked += 1;
                match self.link(&answer.question_id, &answer.id).await {
                    Ok(true) => report.relinked += 1,
                    Ok(false) => report.failed += 1,
                    Err(err) => {
                        warn!(answer_id = %answer.id, error = %err, "answer relink failed");
                        report.failed += 1;
                    }
                }
            }
            if fetched < RECONCILE_BATCH as usize {
                break;
            }
        }
        info!(
            unlinked = report.unlinked,
            relinked = report.relinked,
            failed = report.failed,
            "answer link reconciliation finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
#[path = "answer_service_tests.rs"]
mod tests;

//! Vote service: apply up/down votes to answers and notify their owners.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::answer_service::{ANSWER_NOT_FOUND, map_answer_repository_error};
use crate::domain::populate::user_summary;
use crate::domain::ports::{
    AnswerRepository, NotificationDispatcher, QuestionRepository, UserRepository, VoteOutcome,
    VoteRequest, VoteService, VoteTally,
};
use crate::domain::question_service::map_question_repository_error;
use crate::domain::{
    Answer, AnswerDetails, AnswerId, Error, NotificationDraft, NotificationKind,
    NotificationMessage, User,
};

/// Vote service implementing the [`VoteService`] driving port.
#[derive(Clone)]
pub struct VoteServiceImpl<A, Q, U, D> {
    answers: Arc<A>,
    questions: Arc<Q>,
    users: Arc<U>,
    notifications: Arc<D>,
}

impl<A, Q, U, D> VoteServiceImpl<A, Q, U, D> {
    /// Create a service over the answer and question stores.
    pub fn new(answers: Arc<A>, questions: Arc<Q>, users: Arc<U>, notifications: Arc<D>) -> Self {
        Self {
            answers,
            questions,
            users,
            notifications,
        }
    }
}

impl<A, Q, U, D> VoteServiceImpl<A, Q, U, D>
where
    U: UserRepository,
{
    async fn with_owner(&self, answer: Answer) -> Result<AnswerDetails, Error> {
        let owner = user_summary(self.users.as_ref(), &answer.owner_id).await?;
        Ok(AnswerDetails { answer, owner })
    }
}

#[async_trait]
impl<A, Q, U, D> VoteService for VoteServiceImpl<A, Q, U, D>
where
    A: AnswerRepository,
    Q: QuestionRepository,
    U: UserRepository,
    D: NotificationDispatcher,
{
    async fn vote(&self, voter: &User, request: VoteRequest) -> Result<VoteOutcome, Error> {
        let VoteRequest {
            answer_id,
            direction,
            question_id,
        } = request;

        let answer = self
            .answers
            .find_by_id(&answer_id)
            .await
            .map_err(map_answer_repository_error)?
            .ok_or_else(|| Error::not_found(ANSWER_NOT_FOUND))?;
        if answer.is_owned_by(voter.id()) {
            return Err(Error::rejected("You cannot vote on your own answer"));
        }

        // The closed guard only applies when the caller names the question.
        if let Some(question_id) = question_id {
            let question = self
                .questions
                .find_by_id(&question_id)
                .await
                .map_err(map_question_repository_error)?;
            if question.is_some_and(|question| question.is_closed) {
                return Err(Error::rejected("Cannot vote on answers to closed questions"));
            }
        }

        let updated = self
            .answers
            .apply_vote(&answer_id, direction.delta())
            .await
            .map_err(map_answer_repository_error)?
            .ok_or_else(|| Error::not_found(ANSWER_NOT_FOUND))?;
        info!(%answer_id, voter_id = %voter.id(), votes = updated.votes, "vote applied");

        let text = format!("{} {} your answer", voter.name(), direction.past_tense());
        match NotificationMessage::new(&text) {
            Ok(message) => self.notifications.dispatch(NotificationDraft {
                recipient: updated.owner_id.clone(),
                kind: NotificationKind::Vote,
                message,
                related_question: question_id,
                related_answer: Some(answer_id),
            }),
            Err(err) => warn!(error = %err, "vote notification skipped"),
        }

        let new_vote_count = updated.votes;
        Ok(VoteOutcome {
            answer: self.with_owner(updated).await?,
            new_vote_count,
        })
    }

    async fn get_vote(&self, answer_id: AnswerId) -> Result<VoteTally, Error> {
        let answer = self
            .answers
            .find_by_id(&answer_id)
            .await
            .map_err(map_answer_repository_error)?
            .ok_or_else(|| Error::not_found(ANSWER_NOT_FOUND))?;
        let vote_count = answer.votes;
        Ok(VoteTally {
            answer_id,
            vote_count,
            answer: self.with_owner(answer).await?,
        })
    }
}

#[cfg(test)]
#[path = "vote_service_tests.rs"]
mod tests;

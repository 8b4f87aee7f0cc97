//! Driving port for voting on answers.

use async_trait::async_trait;

use crate::domain::{AnswerDetails, AnswerId, Error, QuestionId, User, VoteDirection};

/// A single vote request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteRequest {
    pub answer_id: AnswerId,
    pub direction: VoteDirection,
    /// When supplied and the question is closed, the vote is refused.
    /// Omitting it skips that check.
    pub question_id: Option<QuestionId>,
}

/// Result of an applied vote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteOutcome {
    pub answer: AnswerDetails,
    pub new_vote_count: i64,
}

/// Current score of an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteTally {
    pub answer_id: AnswerId,
    pub vote_count: i64,
    pub answer: AnswerDetails,
}

/// Voting operations exposed to inbound adapters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoteService: Send + Sync {
    /// Apply a vote and notify the answer's owner on a best-effort basis.
    ///
    /// Votes are not deduplicated: repeating a request applies it again.
    async fn vote(&self, voter: &User, request: VoteRequest) -> Result<VoteOutcome, Error>;

    /// Read an answer's current score.
    async fn get_vote(&self, answer_id: AnswerId) -> Result<VoteTally, Error>;
}

//! Answers posted against questions.

use std::fmt;

use chrono::{DateTime, Utc};
use pagination::PageRequest;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{AnswerId, QuestionId, UserId, UserSummary};

/// Minimum answer length in characters, measured after trimming.
pub const ANSWER_MIN_LENGTH: usize = 10;

/// Reasons answer content is refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerValidationError {
    Empty,
    TooShort { min: usize },
}

impl fmt::Display for AnswerValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Answer content is required"),
            Self::TooShort { min } => write!(f, "Answer must be at least {min} characters long"),
        }
    }
}

impl std::error::Error for AnswerValidationError {}

/// Trimmed answer body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AnswerContent(String);

impl AnswerContent {
    /// Validate raw answer text.
    ///
    /// The minimum length applies to the text as submitted; surrounding
    /// whitespace is only stripped from the stored body.
    pub fn new(raw: &str) -> Result<Self, AnswerValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AnswerValidationError::Empty);
        }
        if raw.chars().count() < ANSWER_MIN_LENGTH {
            return Err(AnswerValidationError::TooShort {
                min: ANSWER_MIN_LENGTH,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for AnswerContent {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// A response to a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    #[schema(value_type = String, format = Uuid)]
    pub id: AnswerId,
    #[schema(value_type = String)]
    pub content: AnswerContent,
    #[schema(value_type = String, format = Uuid)]
    pub question_id: QuestionId,
    #[schema(value_type = String, format = Uuid)]
    pub owner_id: UserId,
    pub votes: i64,
    pub accepted: bool,
    pub created_at: DateTime<Utc>,
}

impl Answer {
    /// Fresh answer with no votes.
    pub fn create(
        id: AnswerId,
        content: AnswerContent,
        question_id: QuestionId,
        owner_id: UserId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            content,
            question_id,
            owner_id,
            votes: 0,
            accepted: false,
            created_at: now,
        }
    }

    /// Whether `user_id` wrote this answer.
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.owner_id == user_id
    }
}

/// Answer with its owner's public fields populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AnswerDetails {
    #[serde(flatten)]
    pub answer: Answer,
    pub owner: Option<UserSummary>,
}

/// Ordering applied to answer listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AnswerSort {
    #[default]
    Newest,
    Oldest,
    MostVoted,
    /// Accepted answers first, then newest.
    Accepted,
}

impl AnswerSort {
    /// Parse the `sort` query value; unknown or missing values mean newest.
    pub fn from_query(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("oldest") => Self::Oldest,
            Some("mostVoted") => Self::MostVoted,
            Some("accepted") => Self::Accepted,
            _ => Self::Newest,
        }
    }
}

/// Answers of one question, ordered and paged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerListQuery {
    pub question_id: QuestionId,
    pub sort: AnswerSort,
    pub page: PageRequest,
}

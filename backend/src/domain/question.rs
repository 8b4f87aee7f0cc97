//! Question records, their validated text fields and list queries.

use std::fmt;

use chrono::{DateTime, Utc};
use pagination::PageRequest;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{AnswerId, QuestionId, UserId, UserSummary};

/// Minimum title length in characters.
pub const TITLE_MIN_LENGTH: usize = 10;
/// Maximum title length in characters.
pub const TITLE_MAX_LENGTH: usize = 200;
/// Minimum description length in characters.
pub const DESCRIPTION_MIN_LENGTH: usize = 20;

/// Reasons a question draft is refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionValidationError {
    /// Title or description was missing or blank.
    MissingFields,
    TitleTooShort { min: usize },
    TitleTooLong { max: usize },
    DescriptionTooShort { min: usize },
}

impl fmt::Display for QuestionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFields => write!(f, "Title and description are required"),
            Self::TitleTooShort { min } => {
                write!(f, "Title must be at least {min} characters long")
            }
            Self::TitleTooLong { max } => {
                write!(f, "Title must be at most {max} characters long")
            }
            Self::DescriptionTooShort { min } => {
                write!(f, "Description must be at least {min} characters long")
            }
        }
    }
}

impl std::error::Error for QuestionValidationError {}

/// Question title, trimmed, 10 to 200 characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QuestionTitle(String);

impl QuestionTitle {
    /// Validate a raw title.
    pub fn new(raw: &str) -> Result<Self, QuestionValidationError> {
        let trimmed = raw.trim();
        let length = trimmed.chars().count();
        if length == 0 {
            return Err(QuestionValidationError::MissingFields);
        }
        if length < TITLE_MIN_LENGTH {
            return Err(QuestionValidationError::TitleTooShort {
                min: TITLE_MIN_LENGTH,
            });
        }
        if length > TITLE_MAX_LENGTH {
            return Err(QuestionValidationError::TitleTooLong {
                max: TITLE_MAX_LENGTH,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for QuestionTitle {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Question body text, trimmed, at least 20 characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QuestionDescription(String);

impl QuestionDescription {
    /// Validate a raw description.
    pub fn new(raw: &str) -> Result<Self, QuestionValidationError> {
        let trimmed = raw.trim();
        let length = trimmed.chars().count();
        if length == 0 {
            return Err(QuestionValidationError::MissingFields);
        }
        if length < DESCRIPTION_MIN_LENGTH {
            return Err(QuestionValidationError::DescriptionTooShort {
                min: DESCRIPTION_MIN_LENGTH,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for QuestionDescription {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Lowercase, trimmed topic tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Tag(String);

impl Tag {
    /// Normalise a raw tag; blank input yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalised = raw.trim().to_lowercase();
        (!normalised.is_empty()).then_some(Self(normalised))
    }

    /// Normalise a tag list into an ordered set: first occurrence wins and
    /// blanks are dropped.
    ///
    /// ```
    /// use forum_backend::domain::Tag;
    ///
    /// let tags = Tag::normalise_all(["Rust", " css ", "rust", ""]);
    /// let names: Vec<&str> = tags.iter().map(AsRef::as_ref).collect();
    /// assert_eq!(names, ["rust", "css"]);
    /// ```
    pub fn normalise_all<I, S>(raw: I) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tags: Vec<Self> = Vec::new();
        for tag in raw.into_iter().filter_map(|item| Self::parse(item.as_ref())) {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        tags
    }
}

impl AsRef<str> for Tag {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Validated input for a new question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub title: QuestionTitle,
    pub description: QuestionDescription,
    pub tags: Vec<Tag>,
}

impl QuestionDraft {
    /// Validate raw fields. Blank title or description reports
    /// [`QuestionValidationError::MissingFields`] before any length check.
    pub fn try_from_parts<S: AsRef<str>>(
        title: &str,
        description: &str,
        tags: &[S],
    ) -> Result<Self, QuestionValidationError> {
        if title.trim().is_empty() || description.trim().is_empty() {
            return Err(QuestionValidationError::MissingFields);
        }
        Ok(Self {
            title: QuestionTitle::new(title)?,
            description: QuestionDescription::new(description)?,
            tags: Tag::normalise_all(tags),
        })
    }
}

/// A posted question.
///
/// `answer_ids` is a back-reference list kept in append order; answers point
/// at their question independently, so the list can be rebuilt when a write
/// goes missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[schema(value_type = String, format = Uuid)]
    pub id: QuestionId,
    #[schema(value_type = String)]
    pub title: QuestionTitle,
    #[schema(value_type = String)]
    pub description: QuestionDescription,
    #[schema(value_type = String, format = Uuid)]
    pub author_id: UserId,
    #[schema(value_type = Vec<String>)]
    pub tags: Vec<Tag>,
    pub votes: i64,
    pub views: i64,
    #[serde(rename = "answers")]
    #[schema(value_type = Vec<String>)]
    pub answer_ids: Vec<AnswerId>,
    #[schema(value_type = Option<String>, format = Uuid)]
    pub accepted_answer: Option<AnswerId>,
    pub is_closed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Question {
    /// Create a fresh open question with zeroed counters.
    pub fn create(id: QuestionId, draft: QuestionDraft, author_id: UserId, now: DateTime<Utc>) -> Self {
        let QuestionDraft {
            title,
            description,
            tags,
        } = draft;
        Self {
            id,
            title,
            description,
            author_id,
            tags,
            votes: 0,
            views: 0,
            answer_ids: Vec::new(),
            accepted_answer: None,
            is_closed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `answer_id` is present in the back-reference list.
    pub fn links_answer(&self, answer_id: &AnswerId) -> bool {
        self.answer_ids.contains(answer_id)
    }

    /// Whether the question has no answers recorded.
    pub fn is_unanswered(&self) -> bool {
        self.answer_ids.is_empty()
    }

    /// Case-insensitive literal match against title, description or any tag.
    /// `needle` must already be lowercase.
    pub fn matches_search(&self, needle: &str) -> bool {
        self.title.as_ref().to_lowercase().contains(needle)
            || self.description.as_ref().to_lowercase().contains(needle)
            || self.tags.iter().any(|tag| tag.as_ref().contains(needle))
    }
}

/// Question with its author's public fields populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct QuestionDetails {
    #[serde(flatten)]
    pub question: Question,
    pub author: Option<UserSummary>,
}

/// Ordering applied to question listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuestionSort {
    #[default]
    Newest,
    Oldest,
    MostVoted,
    /// Only questions with no answers, newest first.
    Unanswered,
}

impl QuestionSort {
    /// Parse the `sort` query value; unknown or missing values mean newest.
    pub fn from_query(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("oldest") => Self::Oldest,
            Some("mostVoted") => Self::MostVoted,
            Some("unanswered") => Self::Unanswered,
            _ => Self::Newest,
        }
    }
}

/// Filters, ordering and page for a question listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuestionListQuery {
    search: Option<String>,
    pub sort: QuestionSort,
    pub page: PageRequest,
}

impl QuestionListQuery {
    /// Build a query; blank search text is treated as absent.
    pub fn new(search: Option<&str>, sort: QuestionSort, page: PageRequest) -> Self {
        let search = search
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase);
        Self { search, sort, page }
    }

    /// Lowercased search term, if any.
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Whether `question` passes this query's filters.
    pub fn admits(&self, question: &Question) -> bool {
        if self.sort == QuestionSort::Unanswered && !question.is_unanswered() {
            return false;
        }
        self.search
            .as_deref()
            .is_none_or(|needle| question.matches_search(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    const TITLE: &str = "How do I center a div?";
    const DESCRIPTION: &str = "Flexbox keeps confusing me.";

    #[fixture]
    fn question() -> Question {
        let draft = QuestionDraft::try_from_parts(TITLE, DESCRIPTION, &["CSS", "layout"])
            .expect("valid draft");
        Question::create(QuestionId::random(), draft, UserId::random(), Utc::now())
    }

    #[rstest]
    #[case("", DESCRIPTION, QuestionValidationError::MissingFields)]
    #[case(TITLE, "   ", QuestionValidationError::MissingFields)]
    #[case("too short", DESCRIPTION, QuestionValidationError::TitleTooShort { min: 10 })]
    #[case(TITLE, "nineteen characters", QuestionValidationError::DescriptionTooShort { min: 20 })]
    fn draft_rejects_invalid_text(
        #[case] title: &str,
        #[case] description: &str,
        #[case] expected: QuestionValidationError,
    ) {
        let tags: [&str; 0] = [];
        assert_eq!(
            QuestionDraft::try_from_parts(title, description, &tags),
            Err(expected)
        );
    }

    #[rstest]
    fn title_length_is_capped() {
        let long = "t".repeat(TITLE_MAX_LENGTH + 1);
        assert_eq!(
            QuestionTitle::new(&long),
            Err(QuestionValidationError::TitleTooLong {
                max: TITLE_MAX_LENGTH
            })
        );
        assert!(QuestionTitle::new(&"t".repeat(TITLE_MAX_LENGTH)).is_ok());
    }

    #[rstest]
    fn boundary_lengths_are_accepted() {
        assert!(QuestionTitle::new("0123456789").is_ok());
        assert!(QuestionDescription::new("01234567890123456789").is_ok());
    }

    #[rstest]
    fn created_question_starts_empty(question: Question) {
        assert_eq!(question.votes, 0);
        assert_eq!(question.views, 0);
        assert!(question.is_unanswered());
        assert!(!question.is_closed);
        assert_eq!(question.created_at, question.updated_at);
        let tags: Vec<&str> = question.tags.iter().map(AsRef::as_ref).collect();
        assert_eq!(tags, ["css", "layout"]);
    }

    #[rstest]
    #[case("CENTER", true)]
    #[case("flexbox", true)]
    #[case("css", true)]
    #[case("grid", false)]
    #[case("div?", true)]
    #[case(".*", false)]
    fn search_is_literal_and_case_insensitive(
        question: Question,
        #[case] term: &str,
        #[case] expected: bool,
    ) {
        let query = QuestionListQuery::new(Some(term), QuestionSort::Newest, PageRequest::default());
        assert_eq!(query.admits(&question), expected);
    }

    #[rstest]
    fn unanswered_sort_filters_answered_questions(mut question: Question) {
        let query = QuestionListQuery::new(None, QuestionSort::Unanswered, PageRequest::default());
        assert!(query.admits(&question));
        question.answer_ids.push(AnswerId::random());
        assert!(!query.admits(&question));
    }

    #[rstest]
    #[case(None, QuestionSort::Newest)]
    #[case(Some("oldest"), QuestionSort::Oldest)]
    #[case(Some("mostVoted"), QuestionSort::MostVoted)]
    #[case(Some("unanswered"), QuestionSort::Unanswered)]
    #[case(Some("random"), QuestionSort::Newest)]
    fn sort_parsing_falls_back_to_newest(
        #[case] raw: Option<&str>,
        #[case] expected: QuestionSort,
    ) {
        assert_eq!(QuestionSort::from_query(raw), expected);
    }

    #[rstest]
    fn details_flatten_question_fields(question: Question) {
        let details = QuestionDetails {
            question,
            author: None,
        };
        let value = serde_json::to_value(&details).expect("serialise details");
        assert_eq!(value["title"], TITLE);
        assert_eq!(value["answers"], serde_json::json!([]));
        assert_eq!(value["isClosed"], false);
        assert!(value["author"].is_null());
    }
}

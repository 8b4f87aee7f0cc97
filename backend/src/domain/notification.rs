//! User notifications and the actions users take on them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use pagination::PageRequest;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{AnswerId, NotificationId, QuestionId, UserId};

/// Validation failures for notification input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationValidationError {
    InvalidKind,
    EmptyMessage,
    InvalidAction,
}

impl fmt::Display for NotificationValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidKind => write!(f, "Invalid notification type"),
            Self::EmptyMessage => write!(f, "Notification message is required"),
            Self::InvalidAction => write!(f, "Invalid action"),
        }
    }
}

impl std::error::Error for NotificationValidationError {}

/// Event category a notification describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Answer,
    Comment,
    Mention,
    Vote,
}

impl NotificationKind {
    /// Lowercase name as stored and serialised.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Answer => "answer",
            Self::Comment => "comment",
            Self::Mention => "mention",
            Self::Vote => "vote",
        }
    }
}

impl FromStr for NotificationKind {
    type Err = NotificationValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "answer" => Ok(Self::Answer),
            "comment" => Ok(Self::Comment),
            "mention" => Ok(Self::Mention),
            "vote" => Ok(Self::Vote),
            _ => Err(NotificationValidationError::InvalidKind),
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trimmed, non-empty notification text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NotificationMessage(String);

impl NotificationMessage {
    /// Validate raw message text.
    pub fn new(raw: &str) -> Result<Self, NotificationValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(NotificationValidationError::EmptyMessage);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for NotificationMessage {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Content of a notification before it is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDraft {
    pub recipient: UserId,
    pub kind: NotificationKind,
    pub message: NotificationMessage,
    pub related_question: Option<QuestionId>,
    pub related_answer: Option<AnswerId>,
}

/// A stored notification addressed to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[schema(value_type = String, format = Uuid)]
    pub id: NotificationId,
    #[schema(value_type = String, format = Uuid)]
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[schema(value_type = String)]
    pub message: NotificationMessage,
    pub read: bool,
    #[schema(value_type = Option<String>, format = Uuid)]
    pub related_question_id: Option<QuestionId>,
    #[schema(value_type = Option<String>, format = Uuid)]
    pub related_answer_id: Option<AnswerId>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Materialise a draft as an unread notification.
    pub fn from_draft(id: NotificationId, draft: NotificationDraft, now: DateTime<Utc>) -> Self {
        let NotificationDraft {
            recipient,
            kind,
            message,
            related_question,
            related_answer,
        } = draft;
        Self {
            id,
            user_id: recipient,
            kind,
            message,
            read: false,
            related_question_id: related_question,
            related_answer_id: related_answer,
            created_at: now,
        }
    }
}

/// Title of the question a notification refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RelatedQuestion {
    #[schema(value_type = String, format = Uuid)]
    pub id: QuestionId,
    pub title: String,
}

/// Body of the answer a notification refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RelatedAnswer {
    #[schema(value_type = String, format = Uuid)]
    pub id: AnswerId,
    pub content: String,
}

/// Notification with its related records populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDetails {
    #[serde(flatten)]
    pub notification: Notification,
    pub related_question: Option<RelatedQuestion>,
    pub related_answer: Option<RelatedAnswer>,
}

/// Mutation requested through the notification update endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationAction {
    MarkRead,
    MarkUnread,
    Delete,
    /// Flip every unread notification of the caller; ignores any id.
    MarkAllRead,
}

impl NotificationAction {
    /// Whether the action targets a single notification.
    pub const fn needs_target(self) -> bool {
        !matches!(self, Self::MarkAllRead)
    }
}

impl FromStr for NotificationAction {
    type Err = NotificationValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "mark-read" => Ok(Self::MarkRead),
            "mark-unread" => Ok(Self::MarkUnread),
            "delete" => Ok(Self::Delete),
            "mark-all-read" => Ok(Self::MarkAllRead),
            _ => Err(NotificationValidationError::InvalidAction),
        }
    }
}

/// Which notifications a bulk delete removes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NotificationScope {
    #[default]
    All,
    /// Only notifications already marked read.
    Read,
}

impl NotificationScope {
    /// Parse the `action` query value; anything except `read` means all.
    pub fn from_query(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("read") => Self::Read,
            _ => Self::All,
        }
    }

    /// Whether `notification` falls inside the scope.
    pub fn includes(self, notification: &Notification) -> bool {
        match self {
            Self::All => true,
            Self::Read => notification.read,
        }
    }
}

/// One user's notifications, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationListQuery {
    pub user_id: UserId,
    pub unread_only: bool,
    pub page: PageRequest,
}

impl NotificationListQuery {
    /// Whether `notification` belongs in this listing.
    pub fn admits(&self, notification: &Notification) -> bool {
        notification.user_id == self.user_id && !(self.unread_only && notification.read)
    }
}

//! Domain primitives, aggregates and services.
//!
//! Purpose: define the forum's entities (users, questions, answers,
//! notifications) with their invariants, and the services that implement the
//! driving ports in [`ports`]. Nothing here knows about HTTP or SQL.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure with a stable code.
//! - TraceId: request-scoped correlation identifier.
//! - User, Question, Answer, Notification and their validated value types.
//! - `*ServiceImpl`: driving-port implementations wired by the server.

pub mod answer;
pub mod auth;
pub mod error;
pub mod ids;
pub mod notification;
pub mod ports;
pub mod question;
pub mod trace_id;
pub mod user;
pub mod vote;

mod answer_service;
mod identity_service;
mod notification_dispatcher;
mod notification_service;
mod populate;
mod question_service;
#[cfg(test)]
mod service_test_support;
mod vote_service;

pub use self::answer::{
    ANSWER_MIN_LENGTH, Answer, AnswerContent, AnswerDetails, AnswerListQuery, AnswerSort,
    AnswerValidationError,
};
pub use self::answer_service::{AnswerServiceImpl, LINK_ATTEMPTS};
pub use self::auth::{
    AccessToken, AuthSession, LoginCredentials, LoginValidationError, PASSWORD_MIN_LENGTH,
    PasswordHash, PlainPassword, Registration, RegistrationValidationError, TokenClaims,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::identity_service::{DEFAULT_TOKEN_TTL_SECS, IdentityServiceImpl};
pub use self::ids::{AnswerId, NotificationId, QuestionId};
pub use self::notification::{
    Notification, NotificationAction, NotificationDetails, NotificationDraft, NotificationKind,
    NotificationListQuery, NotificationMessage, NotificationScope, NotificationValidationError,
    RelatedAnswer, RelatedQuestion,
};
pub use self::notification_dispatcher::BackgroundNotificationDispatcher;
pub use self::notification_service::NotificationServiceImpl;
pub use self::question::{
    DESCRIPTION_MIN_LENGTH, Question, QuestionDescription, QuestionDetails, QuestionDraft,
    QuestionListQuery, QuestionSort, QuestionTitle, QuestionValidationError, TITLE_MAX_LENGTH,
    TITLE_MIN_LENGTH, Tag,
};
pub use self::question_service::QuestionServiceImpl;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    DISPLAY_NAME_MAX, DisplayName, EmailAddress, Role, User, UserId, UserSummary,
    UserValidationError,
};
pub use self::vote::{InvalidVoteDirection, VoteDirection};
pub use self::vote_service::VoteServiceImpl;

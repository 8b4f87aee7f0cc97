//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (repositories, hashing, token signing, notification
//! delivery, metrics) are implemented in `outbound`. Driving ports (the
//! `*Service` traits) are implemented by domain services and called from
//! `inbound::http`.

mod macros;
pub(crate) use macros::define_port_error;

mod access_token_codec;
mod answer_repository;
mod answer_service;
mod credential_hasher;
mod identity_service;
mod notification_dispatcher;
mod notification_metrics;
mod notification_repository;
mod notification_service;
mod question_repository;
mod question_service;
mod user_repository;
mod vote_service;

#[cfg(test)]
pub use access_token_codec::MockAccessTokenCodec;
pub use access_token_codec::{AccessTokenCodec, AccessTokenError};
#[cfg(test)]
pub use answer_repository::MockAnswerRepository;
pub use answer_repository::{AnswerRepository, AnswerRepositoryError};
#[cfg(test)]
pub use answer_service::MockAnswerService;
pub use answer_service::{AnswerService, ReconciliationReport};
#[cfg(test)]
pub use credential_hasher::MockCredentialHasher;
pub use credential_hasher::{CredentialHasher, CredentialHasherError};
#[cfg(test)]
pub use identity_service::MockIdentityService;
pub use identity_service::IdentityService;
#[cfg(test)]
pub use notification_dispatcher::MockNotificationDispatcher;
pub use notification_dispatcher::NotificationDispatcher;
#[cfg(test)]
pub use notification_metrics::MockNotificationMetrics;
pub use notification_metrics::{
    NoOpNotificationMetrics, NotificationMetrics, NotificationMetricsError,
};
#[cfg(test)]
pub use notification_repository::MockNotificationRepository;
pub use notification_repository::{NotificationRepository, NotificationRepositoryError};
#[cfg(test)]
pub use notification_service::MockNotificationService;
pub use notification_service::{
    NotificationListing, NotificationService, NotificationUpdateOutcome,
};
#[cfg(test)]
pub use question_repository::MockQuestionRepository;
pub use question_repository::{QuestionRepository, QuestionRepositoryError};
#[cfg(test)]
pub use question_service::MockQuestionService;
pub use question_service::QuestionService;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserCredentials, UserRepository, UserRepositoryError};
#[cfg(test)]
pub use vote_service::MockVoteService;
pub use vote_service::{VoteOutcome, VoteRequest, VoteService, VoteTally};

//! Builders wiring repositories, security adapters and domain services into
//! the HTTP state.
//!
//! The same service graph is assembled over either the in-memory store or the
//! Diesel repositories; only the adapters differ.

use std::sync::Arc;

use chrono::TimeDelta;
use mockable::Clock;

use crate::domain::ports::{
    AnswerRepository, NotificationMetrics, NotificationRepository, QuestionRepository,
    UserRepository,
};
use crate::domain::{
    AnswerServiceImpl, BackgroundNotificationDispatcher, IdentityServiceImpl,
    NotificationServiceImpl, QuestionServiceImpl, VoteServiceImpl,
};
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::MemoryStore;
use crate::outbound::persistence::{
    DbPool, DieselAnswerRepository, DieselNotificationRepository, DieselQuestionRepository,
    DieselUserRepository,
};
use crate::outbound::security::{Argon2CredentialHasher, HmacTokenCodec};

/// Dispatcher type shared by the vote and answer services.
pub type SharedDispatcher =
    BackgroundNotificationDispatcher<dyn NotificationRepository, dyn NotificationMetrics>;

/// Password hashing and token signing adapters plus the token lifetime.
#[derive(Clone)]
pub struct SecurityAdapters {
    pub hasher: Arc<Argon2CredentialHasher>,
    pub tokens: Arc<HmacTokenCodec>,
    pub token_ttl: TimeDelta,
}

/// Everything the HTTP layer and the process lifecycle need from the domain.
#[derive(Clone)]
pub struct ForumServices {
    /// Driving ports handed to handlers.
    pub http_state: HttpState,
    /// Background notification writer; await [`SharedDispatcher::wait_idle`]
    /// before exiting so queued deliveries finish.
    pub dispatcher: Arc<SharedDispatcher>,
}

/// One adapter per repository port.
pub struct Repositories<U, Q, A, N> {
    pub users: Arc<U>,
    pub questions: Arc<Q>,
    pub answers: Arc<A>,
    pub notifications: Arc<N>,
}

/// Wire the domain services over arbitrary repository adapters.
pub fn assemble<U, Q, A, N>(
    repositories: Repositories<U, Q, A, N>,
    security: SecurityAdapters,
    metrics: Arc<dyn NotificationMetrics>,
    clock: Arc<dyn Clock>,
) -> ForumServices
where
    U: UserRepository + 'static,
    Q: QuestionRepository + 'static,
    A: AnswerRepository + 'static,
    N: NotificationRepository + 'static,
{
    let Repositories {
        users,
        questions,
        answers,
        notifications,
    } = repositories;

    let delivery_store: Arc<dyn NotificationRepository> = notifications.clone();
    let dispatcher = Arc::new(SharedDispatcher::new(
        delivery_store,
        metrics,
        Arc::clone(&clock),
    ));

    let identity = IdentityServiceImpl::new(
        Arc::clone(&users),
        security.hasher,
        security.tokens,
        Arc::clone(&clock),
    )
    .with_token_ttl(security.token_ttl);
    let question_service =
        QuestionServiceImpl::new(Arc::clone(&questions), Arc::clone(&users), Arc::clone(&clock));
    let answer_service = AnswerServiceImpl::new(
        Arc::clone(&answers),
        Arc::clone(&questions),
        Arc::clone(&users),
        Arc::clone(&dispatcher),
        Arc::clone(&clock),
    );
    let vote_service = VoteServiceImpl::new(
        Arc::clone(&answers),
        Arc::clone(&questions),
        users,
        Arc::clone(&dispatcher),
    );
    let notification_service = NotificationServiceImpl::new(notifications, questions, answers, clock);

    ForumServices {
        http_state: HttpState::new(
            Arc::new(identity),
            Arc::new(question_service),
            Arc::new(answer_service),
            Arc::new(vote_service),
            Arc::new(notification_service),
        ),
        dispatcher,
    }
}

/// Services backed by a shared in-memory store.
pub fn memory_services(
    store: &MemoryStore,
    security: SecurityAdapters,
    metrics: Arc<dyn NotificationMetrics>,
    clock: Arc<dyn Clock>,
) -> ForumServices {
    let (users, questions, answers, notifications) = store.repositories();
    assemble(
        Repositories {
            users: Arc::new(users),
            questions: Arc::new(questions),
            answers: Arc::new(answers),
            notifications: Arc::new(notifications),
        },
        security,
        metrics,
        clock,
    )
}

/// Services backed by PostgreSQL through `pool`.
pub fn diesel_services(
    pool: &DbPool,
    security: SecurityAdapters,
    metrics: Arc<dyn NotificationMetrics>,
    clock: Arc<dyn Clock>,
) -> ForumServices {
    assemble(
        Repositories {
            users: Arc::new(DieselUserRepository::new(pool.clone())),
            questions: Arc::new(DieselQuestionRepository::new(pool.clone())),
            answers: Arc::new(DieselAnswerRepository::new(pool.clone())),
            notifications: Arc::new(DieselNotificationRepository::new(pool.clone())),
        },
        security,
        metrics,
        clock,
    )
}

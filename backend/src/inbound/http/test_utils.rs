//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use chrono::{TimeDelta, TimeZone, Utc};
use mockable::DefaultClock;
use serde_json::{Value, json};

use crate::domain::ports::{
    MockAnswerService, MockIdentityService, MockNotificationService, MockQuestionService,
    MockVoteService, NoOpNotificationMetrics,
};
use crate::domain::{DisplayName, EmailAddress, Role, User, UserId};
use crate::inbound::http::error::{json_error_handler, query_error_handler};
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::MemoryStore;
use crate::outbound::security::{Argon2CredentialHasher, HashCost, HmacTokenCodec};
use crate::server::{ForumServices, SecurityAdapters, memory_services};

/// Mocked driving ports; unset expectations panic when called.
#[derive(Default)]
pub struct MockPorts {
    pub identity: MockIdentityService,
    pub questions: MockQuestionService,
    pub answers: MockAnswerService,
    pub votes: MockVoteService,
    pub notifications: MockNotificationService,
}

/// Build state over mocks after `configure` has set expectations.
pub fn mocked_state(configure: impl FnOnce(&mut MockPorts)) -> HttpState {
    let mut ports = MockPorts::default();
    configure(&mut ports);
    HttpState::new(
        Arc::new(ports.identity),
        Arc::new(ports.questions),
        Arc::new(ports.answers),
        Arc::new(ports.votes),
        Arc::new(ports.notifications),
    )
}

/// A user with a fresh id and a deterministic creation time.
pub fn sample_user(name: &str, role: Role) -> User {
    let email = format!("{}@example.com", name.to_lowercase());
    User::new(
        UserId::random(),
        DisplayName::new(name).expect("fixture name"),
        EmailAddress::new(email).expect("fixture email"),
        role,
        Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0)
            .single()
            .expect("fixture timestamp"),
    )
}

/// Real services over a fresh in-memory store with cheap hashing.
pub fn memory_forum() -> ForumServices {
    memory_services(
        &MemoryStore::new(),
        SecurityAdapters {
            hasher: Arc::new(Argon2CredentialHasher::new(HashCost::fast()).expect("hash cost")),
            tokens: Arc::new(HmacTokenCodec::new(vec![42_u8; 32])),
            token_ttl: TimeDelta::hours(1),
        },
        Arc::new(NoOpNotificationMetrics),
        Arc::new(DefaultClock),
    )
}

/// App with JSON/query error handlers, `state`, and `routes` under `/api`.
pub fn api_app<F>(
    state: HttpState,
    routes: F,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
>
where
    F: FnOnce(&mut web::ServiceConfig),
{
    App::new()
        .app_data(web::Data::new(state))
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .service(web::scope("/api").configure(routes))
}

/// Registration payload for `name` with a derived email.
pub fn registration_body(name: &str, role: Option<&str>) -> Value {
    json!({
        "name": name,
        "email": format!("{}@example.com", name.to_lowercase()),
        "password": "secret1",
        "role": role,
    })
}

/// `Authorization` header value for `token`.
pub fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (
        actix_web::http::header::AUTHORIZATION,
        format!("Bearer {token}"),
    )
}

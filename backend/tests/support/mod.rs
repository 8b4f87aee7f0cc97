//! Shared harness for the forum integration tests.
//!
//! Builds the full application over in-memory adapters, optionally swapping
//! in fault-injecting repository doubles, and offers small request helpers.

#![allow(dead_code, reason = "each test binary uses a different subset")]

pub mod doubles;

use std::sync::Arc;

use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use actix_web::web;
use chrono::TimeDelta;
use forum_backend::domain::ports::{
    AnswerRepository, NoOpNotificationMetrics, NotificationRepository, QuestionRepository,
    UserRepository,
};
use forum_backend::inbound::http::health::HealthState;
use forum_backend::outbound::memory::MemoryStore;
use forum_backend::outbound::security::{Argon2CredentialHasher, HashCost, HmacTokenCodec};
use forum_backend::server::{
    ForumServices, Repositories, SecurityAdapters, assemble, memory_services,
};
use mockable::DefaultClock;
use serde_json::{Value, json};

pub const PASSWORD: &str = "secret1";

pub fn security() -> SecurityAdapters {
    SecurityAdapters {
        hasher: Arc::new(Argon2CredentialHasher::new(HashCost::fast()).expect("hash cost")),
        tokens: Arc::new(HmacTokenCodec::new(vec![9_u8; 32])),
        token_ttl: TimeDelta::hours(1),
    }
}

/// Services over a fresh in-memory store.
pub fn memory_forum() -> ForumServices {
    memory_services(
        &MemoryStore::new(),
        security(),
        Arc::new(NoOpNotificationMetrics),
        Arc::new(DefaultClock),
    )
}

/// Services over caller-supplied adapters.
pub fn forum_with<U, Q, A, N>(repositories: Repositories<U, Q, A, N>) -> ForumServices
where
    U: UserRepository + 'static,
    Q: QuestionRepository + 'static,
    A: AnswerRepository + 'static,
    N: NotificationRepository + 'static,
{
    assemble(
        repositories,
        security(),
        Arc::new(NoOpNotificationMetrics),
        Arc::new(DefaultClock),
    )
}

/// Full application for `services`, probes included.
pub fn app_for(
    services: &ForumServices,
) -> actix_web::App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    forum_backend::server::build_app(
        web::Data::new(HealthState::new()),
        web::Data::new(services.http_state.clone()),
    )
}

pub async fn call<S>(app: &S, request: actix_test::TestRequest) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let response = actix_test::call_service(app, request.to_request()).await;
    let status = response.status();
    let body = actix_test::read_body(response).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON body")
    };
    (status, value)
}

pub fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (
        actix_web::http::header::AUTHORIZATION,
        format!("Bearer {token}"),
    )
}

pub fn authed(
    request: actix_test::TestRequest,
    token: &str,
) -> actix_test::TestRequest {
    request.insert_header(bearer(token))
}

/// Register `name` with a derived email and return the bearer token.
pub async fn register<S>(app: &S, name: &str, role: Option<&str>) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (status, body) = call(
        app,
        actix_test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({
                "name": name,
                "email": format!("{}@example.com", name.to_lowercase()),
                "password": PASSWORD,
                "role": role,
            })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register {name}: {body}");
    body["token"].as_str().expect("token").to_owned()
}

/// Post a question as `token` and return its id.
pub async fn ask<S>(app: &S, token: &str) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (status, body) = call(
        app,
        authed(actix_test::TestRequest::post().uri("/api/questions"), token).set_json(json!({
            "title": "How do I center a div?",
            "description": "Flexbox has not helped me",
            "tags": ["css"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "ask: {body}");
    body["question"]["id"].as_str().expect("question id").to_owned()
}

/// Answer `question_id` as `token`, returning the raw response.
pub async fn answer<S>(app: &S, token: &str, question_id: &str) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    call(
        app,
        authed(actix_test::TestRequest::post().uri("/api/answers"), token)
            .set_json(json!({"questionId": question_id, "content": "Use place-items"})),
    )
    .await
}

/// Vote on `answer_id` as `token`, returning the raw response.
pub async fn vote<S>(app: &S, token: &str, body: Value) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    call(
        app,
        authed(actix_test::TestRequest::post().uri("/api/votes"), token).set_json(body),
    )
    .await
}

/// Fetch `/api/questions/{id}`.
pub async fn question<S>(app: &S, question_id: &str) -> Value
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (status, body) = call(
        app,
        actix_test::TestRequest::get().uri(&format!("/api/questions/{question_id}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "get question: {body}");
    body["question"].clone()
}

/// List the caller's notifications with the given query string.
pub async fn notifications<S>(app: &S, token: &str, query: &str) -> Value
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (status, body) = call(
        app,
        authed(
            actix_test::TestRequest::get().uri(&format!("/api/notifications{query}")),
            token,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "list notifications: {body}");
    body
}

//! Account HTTP handlers.
//!
//! ```text
//! POST /api/auth/register {"name":"Alice","email":"a@x.com","password":"secret1"}
//! POST /api/auth/login {"email":"a@x.com","password":"secret1"}
//! GET /api/auth/me
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{AuthSession, Error, LoginCredentials, Registration, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::BadRequest;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Registration request body.
///
/// Fields are optional so a missing field reports the same message as an
/// empty one.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    /// `Guest`, `User` (default) or `Admin`.
    pub role: Option<String>,
}

impl TryFrom<RegisterRequest> for Registration {
    type Error = Error;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(
            value.name.as_deref().unwrap_or_default(),
            value.email.as_deref().unwrap_or_default(),
            value.password.as_deref().unwrap_or_default(),
            value.role.as_deref(),
        )
        .map_err(|err| Error::invalid_request(err.to_string()))
    }
}

/// Login request body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = Error;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(
            value.email.as_deref().unwrap_or_default(),
            value.password.as_deref().unwrap_or_default(),
        )
        .map_err(|err| Error::invalid_request(err.to_string()))
    }
}

/// Create an account and return it with a bearer token.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthSession),
        (status = 400, description = "Invalid input or email already registered", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration = Registration::try_from(payload.into_inner())?;
    let session = state.identity.register(registration).await?;
    Ok(HttpResponse::Created().json(session))
}

/// Exchange credentials for a bearer token.
///
/// Unknown emails and wrong passwords answer `400` with codes `not_found`
/// and `unauthorized` respectively.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = AuthSession),
        (status = 400, description = "Missing fields, unknown user or bad credentials", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, BadRequest> {
    let credentials = LoginCredentials::try_from(payload.into_inner())?;
    let session = state.identity.login(credentials).await?;
    Ok(HttpResponse::Ok().json(session))
}

/// Return the authenticated user.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Authentication required", body = ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "currentUser"
)]
#[get("/auth/me")]
pub async fn current_user(session: SessionContext) -> ApiResult<web::Json<User>> {
    Ok(web::Json(session.require_user()?.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{api_app, bearer, memory_forum, registration_body};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};

    fn routes(cfg: &mut web::ServiceConfig) {
        cfg.service(register).service(login).service(current_user);
    }

    #[rstest]
    #[actix_web::test]
    async fn register_login_and_me_round_trip() {
        let forum = memory_forum();
        let app = actix_test::init_service(api_app(forum.http_state, routes)).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(registration_body("Alice", None))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["user"]["role"], "User");
        assert!(body["user"].get("password").is_none());
        assert!(body["user"].get("passwordHash").is_none());

        let request = actix_test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({"email": "ALICE@example.com", "password": "secret1"}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        let token = body["token"].as_str().expect("token").to_owned();

        let request = actix_test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(bearer(&token))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["email"], "alice@example.com");
    }

    #[rstest]
    #[case(json!({"email": "a@x.com", "password": "secret1"}), "Name, email, and password are required")]
    #[case(json!({"name": "A", "email": "nope", "password": "secret1"}), "Please provide a valid email address")]
    #[case(json!({"name": "A", "email": "a@x.com", "password": "five5"}), "Password must be at least 6 characters long")]
    #[case(json!({"name": "A", "email": "a@x.com", "password": "secret1", "role": "Owner"}), "Invalid role specified")]
    #[actix_web::test]
    async fn register_rejects_invalid_input(#[case] payload: Value, #[case] message: &str) {
        let app = actix_test::init_service(api_app(memory_forum().http_state, routes)).await;
        let request = actix_test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(payload)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["message"], message);
    }

    #[rstest]
    #[actix_web::test]
    async fn duplicate_registration_is_bad_request() {
        let app = actix_test::init_service(api_app(memory_forum().http_state, routes)).await;
        for expected in [StatusCode::CREATED, StatusCode::BAD_REQUEST] {
            let request = actix_test::TestRequest::post()
                .uri("/api/auth/register")
                .set_json(registration_body("Alice", None))
                .to_request();
            let response = actix_test::call_service(&app, request).await;
            assert_eq!(response.status(), expected);
            if expected == StatusCode::BAD_REQUEST {
                let body: Value = actix_test::read_body_json(response).await;
                assert_eq!(body["message"], "User with this email already exists");
                assert_eq!(body["code"], "conflict");
            }
        }
    }

    #[rstest]
    #[case(json!({"email": "alice@example.com"}), "All fields are required", "invalid_request")]
    #[case(json!({"email": "bob@example.com", "password": "secret1"}), "User not found", "not_found")]
    #[case(json!({"email": "alice@example.com", "password": "wrong-pass"}), "Invalid credentials", "unauthorized")]
    #[actix_web::test]
    async fn login_failures_are_bad_requests(
        #[case] payload: Value,
        #[case] message: &str,
        #[case] code: &str,
    ) {
        let app = actix_test::init_service(api_app(memory_forum().http_state, routes)).await;
        let request = actix_test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(registration_body("Alice", None))
            .to_request();
        assert!(actix_test::call_service(&app, request).await.status().is_success());

        let request = actix_test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(payload)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["message"], message);
        assert_eq!(body["code"], code);
    }

    #[rstest]
    #[actix_web::test]
    async fn me_requires_a_token() {
        let app = actix_test::init_service(api_app(memory_forum().http_state, routes)).await;
        let request = actix_test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(bearer("not-a-token"))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects every REST path under `/api`, the health probes and the
//! shared error envelope. Authenticated endpoints use a bearer token issued by
//! `POST /api/auth/register` or `POST /api/auth/login`; public endpoints opt
//! out with `security([])` on their path attribute.
//!
//! Served by Swagger UI in debug builds and printed by `openapi-dump`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::ports::ReconciliationReport;
use crate::domain::{
    Answer, AnswerDetails, AuthSession, Notification, NotificationDetails, NotificationKind,
    Question, QuestionDetails, RelatedAnswer, RelatedQuestion, Role, User, UserSummary,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};

/// Name of the bearer security scheme.
pub const BEARER_SCHEME: &str = "BearerToken";

/// Register the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);
        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("HS256 token returned by register and login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Forum backend API",
        description = "Questions, answers, votes and notifications for a Q&A forum."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::current_user,
        crate::inbound::http::questions::create_question,
        crate::inbound::http::questions::list_questions,
        crate::inbound::http::questions::get_question,
        crate::inbound::http::questions::close_question,
        crate::inbound::http::answers::create_answer,
        crate::inbound::http::answers::list_answers,
        crate::inbound::http::answers::list_question_answers,
        crate::inbound::http::answers::accept_answer,
        crate::inbound::http::votes::vote,
        crate::inbound::http::votes::get_vote,
        crate::inbound::http::notifications::list_notifications,
        crate::inbound::http::notifications::create_notification,
        crate::inbound::http::notifications::update_notification,
        crate::inbound::http::notifications::delete_notifications,
        crate::inbound::http::admin::reconcile_answer_links,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        User,
        UserSummary,
        Role,
        AuthSession,
        Question,
        QuestionDetails,
        Answer,
        AnswerDetails,
        Notification,
        NotificationDetails,
        NotificationKind,
        RelatedQuestion,
        RelatedAnswer,
        ReconciliationReport,
    )),
    tags(
        (name = "auth", description = "Registration, login and the current user"),
        (name = "questions", description = "Asking, searching and closing questions"),
        (name = "answers", description = "Answering questions and accepting answers"),
        (name = "votes", description = "Scoring answers"),
        (name = "notifications", description = "The caller's notification inbox"),
        (name = "admin", description = "Maintenance tasks for administrators"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";

    fn object_fields(schema: &RefOr<Schema>) -> Vec<String> {
        match schema {
            RefOr::T(Schema::Object(obj)) => obj.properties.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    #[rstest]
    #[case(ERROR_SCHEMA_NAME, &["code", "message", "traceId", "details"])]
    #[case("User", &["id", "name", "email", "role", "createdAt"])]
    #[case("ReconciliationReport", &["unlinked", "relinked", "failed"])]
    fn schemas_expose_wire_fields(#[case] name: &str, #[case] fields: &[&str]) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas.get(name).expect("schema registered");
        let present = object_fields(schema);
        for field in fields {
            assert!(present.iter().any(|f| f == field), "{name} lacks {field}");
        }
    }

    #[rstest]
    fn user_schema_never_exposes_password_material() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let fields = object_fields(schemas.get("User").expect("User schema"));
        assert!(fields.iter().all(|f| !f.to_lowercase().contains("password")));
    }

    #[rstest]
    #[case("/api/auth/register")]
    #[case("/api/questions/{id}/answers")]
    #[case("/api/votes")]
    #[case("/api/notifications")]
    #[case("/api/admin/answers/reconcile")]
    #[case("/health/live")]
    fn paths_are_documented(#[case] path: &str) {
        assert!(ApiDoc::openapi().paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.as_ref().expect("components");
        assert!(components.security_schemes.contains_key(BEARER_SCHEME));
    }
}

//! Vote HTTP handlers.
//!
//! ```text
//! POST /api/votes {"answerId":"...","direction":"up","questionId":"..."}
//! GET /api/votes?answerId=...
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::VoteRequest;
use crate::domain::{AnswerDetails, AnswerId, Error, QuestionId, VoteDirection};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, optional_uuid, require_uuid};

const ANSWER_ID: FieldName = FieldName::new("answerId");
const ANSWER_ID_REQUIRED: &str = "Answer ID is required";

/// Vote body. `questionId` opts into the closed-question check.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct VoteBody {
    pub answer_id: Option<String>,
    /// `up` or `down`.
    pub direction: Option<String>,
    pub question_id: Option<String>,
}

impl TryFrom<VoteBody> for VoteRequest {
    type Error = Error;

    fn try_from(body: VoteBody) -> Result<Self, Self::Error> {
        let answer_id = require_uuid(body.answer_id.as_deref(), ANSWER_ID, ANSWER_ID_REQUIRED)
            .map(AnswerId::from_uuid)?;
        let direction = body
            .direction
            .as_deref()
            .unwrap_or_default()
            .parse::<VoteDirection>()
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let question_id = optional_uuid(body.question_id.as_deref(), FieldName::new("questionId"))?
            .map(QuestionId::from_uuid);
        Ok(Self {
            answer_id,
            direction,
            question_id,
        })
    }
}

/// Applied vote.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteResponse {
    pub message: String,
    pub answer: AnswerDetails,
    pub new_vote_count: i64,
}

/// Score lookup filter.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(default, rename_all = "camelCase")]
pub struct VoteQuery {
    pub answer_id: Option<String>,
}

/// Current score of an answer.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteTallyResponse {
    #[schema(value_type = String, format = Uuid)]
    pub answer_id: AnswerId,
    pub vote_count: i64,
    pub answer: AnswerDetails,
}

/// Vote an answer up or down.
///
/// Repeated votes accumulate. Owners cannot vote on their own answers.
#[utoipa::path(
    post,
    path = "/api/votes",
    request_body = VoteBody,
    responses(
        (status = 200, description = "Vote applied", body = VoteResponse),
        (status = 400, description = "Invalid vote, own answer or closed question", body = ErrorSchema),
        (status = 401, description = "Authentication required", body = ErrorSchema),
        (status = 404, description = "Answer not found", body = ErrorSchema)
    ),
    tags = ["votes"],
    operation_id = "vote"
)]
#[post("/votes")]
pub async fn vote(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<VoteBody>,
) -> ApiResult<web::Json<VoteResponse>> {
    let voter = session.require_user()?;
    let request = VoteRequest::try_from(payload.into_inner())?;
    let outcome = state.votes.vote(voter, request).await?;
    Ok(web::Json(VoteResponse {
        message: "Vote updated successfully".to_owned(),
        answer: outcome.answer,
        new_vote_count: outcome.new_vote_count,
    }))
}

/// Read an answer's score.
#[utoipa::path(
    get,
    path = "/api/votes",
    params(VoteQuery),
    responses(
        (status = 200, description = "Current score", body = VoteTallyResponse),
        (status = 400, description = "Missing or malformed answer id", body = ErrorSchema),
        (status = 401, description = "Authentication required", body = ErrorSchema),
        (status = 404, description = "Answer not found", body = ErrorSchema)
    ),
    tags = ["votes"],
    operation_id = "getVote"
)]
#[get("/votes")]
pub async fn get_vote(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<VoteQuery>,
) -> ApiResult<web::Json<VoteTallyResponse>> {
    session.require_user()?;
    let answer_id = require_uuid(query.answer_id.as_deref(), ANSWER_ID, ANSWER_ID_REQUIRED)
        .map(AnswerId::from_uuid)?;
    let tally = state.votes.get_vote(answer_id).await?;
    Ok(web::Json(VoteTallyResponse {
        answer_id: tally.answer_id,
        vote_count: tally.vote_count,
        answer: tally.answer,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::inbound::http::answers::create_answer;
    use crate::inbound::http::auth::register;
    use crate::inbound::http::questions::{close_question, create_question};
    use crate::inbound::http::test_utils::{
        api_app, bearer, memory_forum, mocked_state, registration_body, sample_user,
    };
    use actix_web::dev::{Service, ServiceResponse};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};

    fn routes(cfg: &mut web::ServiceConfig) {
        cfg.service(register)
            .service(create_question)
            .service(close_question)
            .service(create_answer)
            .service(vote)
            .service(get_vote);
    }

    async fn call<S>(app: &S, request: actix_test::TestRequest) -> (StatusCode, Value)
    where
        S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    {
        let response = actix_test::call_service(app, request.to_request()).await;
        let status = response.status();
        (status, actix_test::read_body_json(response).await)
    }

    struct Thread {
        asker: String,
        answerer: String,
        question_id: String,
        answer_id: String,
    }

    async fn thread<S>(app: &S) -> Thread
    where
        S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    {
        let mut tokens = Vec::new();
        for name in ["Alice", "Bob"] {
            let (_, body) = call(
                app,
                actix_test::TestRequest::post()
                    .uri("/api/auth/register")
                    .set_json(registration_body(name, None)),
            )
            .await;
            tokens.push(body["token"].as_str().expect("token").to_owned());
        }
        let answerer = tokens.pop().expect("bob");
        let asker = tokens.pop().expect("alice");
        let (_, question) = call(
            app,
            actix_test::TestRequest::post()
                .uri("/api/questions")
                .insert_header(bearer(&asker))
                .set_json(json!({
                    "title": "How do lifetimes elide?",
                    "description": "When can I leave lifetime parameters out?",
                })),
        )
        .await;
        let question_id = question["question"]["id"].as_str().expect("id").to_owned();
        let (_, answer) = call(
            app,
            actix_test::TestRequest::post()
                .uri("/api/answers")
                .insert_header(bearer(&answerer))
                .set_json(json!({"questionId": question_id, "content": "Read the elision rules."})),
        )
        .await;
        let answer_id = answer["answer"]["id"].as_str().expect("id").to_owned();
        Thread {
            asker,
            answerer,
            question_id,
            answer_id,
        }
    }

    fn vote_request(token: &str, body: Value) -> actix_test::TestRequest {
        actix_test::TestRequest::post()
            .uri("/api/votes")
            .insert_header(bearer(token))
            .set_json(body)
    }

    #[rstest]
    #[actix_web::test]
    async fn repeated_votes_accumulate() {
        let app = actix_test::init_service(api_app(memory_forum().http_state, routes)).await;
        let thread = thread(&app).await;
        let body = json!({"answerId": thread.answer_id, "direction": "up"});

        for expected in [1, 2] {
            let (status, response) = call(&app, vote_request(&thread.asker, body.clone())).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(response["message"], "Vote updated successfully");
            assert_eq!(response["newVoteCount"], expected);
        }

        let (status, tally) = call(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/votes?answerId={}", thread.answer_id))
                .insert_header(bearer(&thread.asker)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(tally["voteCount"], 2);
        assert_eq!(tally["answerId"], thread.answer_id);
    }

    #[rstest]
    #[actix_web::test]
    async fn owners_cannot_vote_on_their_answers() {
        let app = actix_test::init_service(api_app(memory_forum().http_state, routes)).await;
        let thread = thread(&app).await;
        let (status, body) = call(
            &app,
            vote_request(
                &thread.answerer,
                json!({"answerId": thread.answer_id, "direction": "down"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "You cannot vote on your own answer");
    }

    #[rstest]
    #[actix_web::test]
    async fn closed_check_needs_the_question_id() {
        let app = actix_test::init_service(api_app(memory_forum().http_state, routes)).await;
        let thread = thread(&app).await;
        let (status, _) = call(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/api/questions/{}/close", thread.question_id))
                .insert_header(bearer(&thread.asker)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(
            &app,
            vote_request(
                &thread.asker,
                json!({
                    "answerId": thread.answer_id,
                    "direction": "up",
                    "questionId": thread.question_id,
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Cannot vote on answers to closed questions");

        let (status, body) = call(
            &app,
            vote_request(
                &thread.asker,
                json!({"answerId": thread.answer_id, "direction": "up"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["newVoteCount"], 1);
    }

    #[rstest]
    #[case(json!({"direction": "up"}), "Answer ID is required")]
    #[case(json!({"answerId": "00000000-0000-0000-0000-000000000001", "direction": "sideways"}), "Invalid vote direction. Must be \"up\" or \"down\"")]
    #[case(json!({"answerId": "00000000-0000-0000-0000-000000000001"}), "Invalid vote direction. Must be \"up\" or \"down\"")]
    #[actix_web::test]
    async fn malformed_votes_never_reach_the_service(#[case] payload: Value, #[case] message: &str) {
        let state = mocked_state(|ports| {
            ports
                .identity
                .expect_resolve_token()
                .returning(|_| Ok(Some(sample_user("Carol", Role::User))));
            ports.votes.expect_vote().never();
        });
        let app = actix_test::init_service(api_app(state, routes)).await;
        let (status, body) = call(&app, vote_request("token", payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], message);
    }

    #[rstest]
    #[actix_web::test]
    async fn unknown_answers_are_not_found() {
        let app = actix_test::init_service(api_app(memory_forum().http_state, routes)).await;
        let thread = thread(&app).await;
        let (status, body) = call(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/votes?answerId=00000000-0000-0000-0000-000000000001")
                .insert_header(bearer(&thread.asker)),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Answer not found");
    }
}

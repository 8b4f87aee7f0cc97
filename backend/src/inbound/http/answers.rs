//! Answer HTTP handlers.
//!
//! ```text
//! POST /api/answers {"questionId":"...","content":"..."}
//! GET /api/answers?questionId=...&sort=accepted
//! GET /api/questions/{id}/answers
//! POST /api/answers/{id}/accept
//! ```

use actix_web::{HttpResponse, get, post, web};
use pagination::PageRequest;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    AnswerContent, AnswerDetails, AnswerId, AnswerListQuery, AnswerSort, Error, QuestionId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::page_envelope::AnswerPagination;
use crate::inbound::http::questions::question_id_from_path;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid, require_uuid};

const ANSWER_PAGE_LIMIT: u32 = 10;
const QUESTION_ID: FieldName = FieldName::new("questionId");
const QUESTION_ID_REQUIRED: &str = "Question ID is required";

/// New answer body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateAnswerRequest {
    pub question_id: Option<String>,
    pub content: Option<String>,
}

/// Answer listing filters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(default, rename_all = "camelCase")]
pub struct ListAnswersParams {
    /// Required on `GET /api/answers`; ignored on the nested route.
    pub question_id: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    /// `newest` (default), `oldest`, `mostVoted` or `accepted`.
    pub sort: Option<String>,
}

/// Mutation response carrying one answer.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnswerMutationResponse {
    pub message: String,
    pub answer: AnswerDetails,
}

/// Answer listing response.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnswerListResponse {
    pub answers: Vec<AnswerDetails>,
    pub pagination: AnswerPagination,
}

async fn list_for_question(
    state: &HttpState,
    question_id: QuestionId,
    params: &ListAnswersParams,
) -> ApiResult<AnswerListResponse> {
    let page = PageRequest::parse(
        params.page.as_deref(),
        params.limit.as_deref(),
        ANSWER_PAGE_LIMIT,
    );
    let listing = state
        .answers
        .list(AnswerListQuery {
            question_id,
            sort: AnswerSort::from_query(params.sort.as_deref()),
            page,
        })
        .await?;
    Ok(AnswerListResponse {
        answers: listing.items,
        pagination: listing.info.into(),
    })
}

/// Answer an open question as the authenticated user.
#[utoipa::path(
    post,
    path = "/api/answers",
    request_body = CreateAnswerRequest,
    responses(
        (status = 201, description = "Answer created", body = AnswerMutationResponse),
        (status = 400, description = "Invalid answer or closed question", body = ErrorSchema),
        (status = 401, description = "Authentication required", body = ErrorSchema),
        (status = 404, description = "Question not found", body = ErrorSchema),
        (status = 500, description = "Answer stored but not linked", body = ErrorSchema)
    ),
    tags = ["answers"],
    operation_id = "createAnswer"
)]
#[post("/answers")]
pub async fn create_answer(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateAnswerRequest>,
) -> ApiResult<HttpResponse> {
    let owner = session.require_user()?;
    let payload = payload.into_inner();
    let question_id = require_uuid(
        payload.question_id.as_deref(),
        QUESTION_ID,
        QUESTION_ID_REQUIRED,
    )
    .map(QuestionId::from_uuid)?;
    let content = AnswerContent::new(payload.content.as_deref().unwrap_or_default())
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    let answer = state.answers.create(owner, question_id, content).await?;
    Ok(HttpResponse::Created().json(AnswerMutationResponse {
        message: "Answer created successfully".to_owned(),
        answer,
    }))
}

/// Order and page the answers of one question.
#[utoipa::path(
    get,
    path = "/api/answers",
    params(ListAnswersParams),
    responses(
        (status = 200, description = "Answers", body = AnswerListResponse),
        (status = 400, description = "Missing question id or bad pagination", body = ErrorSchema),
        (status = 404, description = "Question not found", body = ErrorSchema)
    ),
    tags = ["answers"],
    operation_id = "listAnswers",
    security([])
)]
#[get("/answers")]
pub async fn list_answers(
    state: web::Data<HttpState>,
    params: web::Query<ListAnswersParams>,
) -> ApiResult<web::Json<AnswerListResponse>> {
    let question_id = require_uuid(
        params.question_id.as_deref(),
        QUESTION_ID,
        QUESTION_ID_REQUIRED,
    )
    .map(QuestionId::from_uuid)?;
    list_for_question(&state, question_id, &params)
        .await
        .map(web::Json)
}

/// Answers of the question named in the path.
#[utoipa::path(
    get,
    path = "/api/questions/{id}/answers",
    params(("id" = String, Path, description = "Question id"), ListAnswersParams),
    responses(
        (status = 200, description = "Answers", body = AnswerListResponse),
        (status = 400, description = "Malformed id or bad pagination", body = ErrorSchema),
        (status = 404, description = "Question not found", body = ErrorSchema)
    ),
    tags = ["answers"],
    operation_id = "listQuestionAnswers",
    security([])
)]
#[get("/questions/{id}/answers")]
pub async fn list_question_answers(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    params: web::Query<ListAnswersParams>,
) -> ApiResult<web::Json<AnswerListResponse>> {
    let question_id = question_id_from_path(&path)?;
    list_for_question(&state, question_id, &params)
        .await
        .map(web::Json)
}

/// Mark an answer accepted; only the question's author may do this.
#[utoipa::path(
    post,
    path = "/api/answers/{id}/accept",
    params(("id" = String, Path, description = "Answer id")),
    responses(
        (status = 200, description = "Answer accepted", body = AnswerMutationResponse),
        (status = 401, description = "Authentication required", body = ErrorSchema),
        (status = 403, description = "Not the question author", body = ErrorSchema),
        (status = 404, description = "Answer not found", body = ErrorSchema)
    ),
    tags = ["answers"],
    operation_id = "acceptAnswer"
)]
#[post("/answers/{id}/accept")]
pub async fn accept_answer(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<AnswerMutationResponse>> {
    let actor = session.require_user()?;
    let answer_id = parse_uuid(&path, FieldName::new("id")).map(AnswerId::from_uuid)?;
    let answer = state.answers.accept(actor, answer_id).await?;
    Ok(web::Json(AnswerMutationResponse {
        message: "Answer accepted successfully".to_owned(),
        answer,
    }))
}

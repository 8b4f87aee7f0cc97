//! Question HTTP handlers.
//!
//! ```text
//! POST /api/questions {"title":"...","description":"...","tags":["rust"]}
//! GET /api/questions?page=1&limit=10&search=flex&sort=mostVoted
//! GET /api/questions/{id}
//! POST /api/questions/{id}/close
//! ```

use actix_web::{HttpResponse, get, post, web};
use pagination::PageRequest;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    Error, QuestionDetails, QuestionDraft, QuestionId, QuestionListQuery, QuestionSort,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::page_envelope::QuestionPagination;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

const QUESTION_PAGE_LIMIT: u32 = 10;

/// New question body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct CreateQuestionRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    /// Free-form tags; blanks are dropped and duplicates collapsed.
    pub tags: Vec<String>,
}

impl TryFrom<CreateQuestionRequest> for QuestionDraft {
    type Error = Error;

    fn try_from(value: CreateQuestionRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(
            value.title.as_deref().unwrap_or_default(),
            value.description.as_deref().unwrap_or_default(),
            &value.tags,
        )
        .map_err(|err| Error::invalid_request(err.to_string()))
    }
}

/// Question listing filters.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(default)]
pub struct ListQuestionsParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    /// Case-insensitive substring matched against title, description and tags.
    pub search: Option<String>,
    /// `newest` (default), `oldest`, `mostVoted` or `unanswered`.
    pub sort: Option<String>,
}

/// Mutation response carrying one question.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionMutationResponse {
    pub message: String,
    pub question: QuestionDetails,
}

/// Single-question response.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionResponse {
    pub question: QuestionDetails,
}

/// Question listing response.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionListResponse {
    pub questions: Vec<QuestionDetails>,
    pub pagination: QuestionPagination,
}

pub(crate) fn question_id_from_path(raw: &str) -> Result<QuestionId, Error> {
    parse_uuid(raw, FieldName::new("id")).map(QuestionId::from_uuid)
}

/// Post a question as the authenticated user.
#[utoipa::path(
    post,
    path = "/api/questions",
    request_body = CreateQuestionRequest,
    responses(
        (status = 201, description = "Question created", body = QuestionMutationResponse),
        (status = 400, description = "Invalid question", body = ErrorSchema),
        (status = 401, description = "Authentication required", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["questions"],
    operation_id = "createQuestion"
)]
#[post("/questions")]
pub async fn create_question(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateQuestionRequest>,
) -> ApiResult<HttpResponse> {
    let author = session.require_user()?;
    let draft = QuestionDraft::try_from(payload.into_inner())?;
    let question = state.questions.create(author, draft).await?;
    Ok(HttpResponse::Created().json(QuestionMutationResponse {
        message: "Question created successfully".to_owned(),
        question,
    }))
}

/// Search, order and page questions.
#[utoipa::path(
    get,
    path = "/api/questions",
    params(ListQuestionsParams),
    responses(
        (status = 200, description = "Questions", body = QuestionListResponse),
        (status = 400, description = "Invalid pagination", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["questions"],
    operation_id = "listQuestions",
    security([])
)]
#[get("/questions")]
pub async fn list_questions(
    state: web::Data<HttpState>,
    params: web::Query<ListQuestionsParams>,
) -> ApiResult<web::Json<QuestionListResponse>> {
    let params = params.into_inner();
    let page = PageRequest::parse(
        params.page.as_deref(),
        params.limit.as_deref(),
        QUESTION_PAGE_LIMIT,
    );
    let query = QuestionListQuery::new(
        params.search.as_deref(),
        QuestionSort::from_query(params.sort.as_deref()),
        page,
    );
    let listing = state.questions.list(query).await?;
    Ok(web::Json(QuestionListResponse {
        questions: listing.items,
        pagination: listing.info.into(),
    }))
}

/// Fetch one question; every fetch counts as a view.
#[utoipa::path(
    get,
    path = "/api/questions/{id}",
    params(("id" = String, Path, description = "Question id")),
    responses(
        (status = 200, description = "Question", body = QuestionResponse),
        (status = 400, description = "Malformed id", body = ErrorSchema),
        (status = 404, description = "Question not found", body = ErrorSchema)
    ),
    tags = ["questions"],
    operation_id = "getQuestion",
    security([])
)]
#[get("/questions/{id}")]
pub async fn get_question(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<QuestionResponse>> {
    let id = question_id_from_path(&path)?;
    let question = state.questions.get_by_id(id).await?;
    Ok(web::Json(QuestionResponse { question }))
}

/// Close a question to new answers and guarded votes.
#[utoipa::path(
    post,
    path = "/api/questions/{id}/close",
    params(("id" = String, Path, description = "Question id")),
    responses(
        (status = 200, description = "Question closed", body = QuestionMutationResponse),
        (status = 401, description = "Authentication required", body = ErrorSchema),
        (status = 403, description = "Not the author or an admin", body = ErrorSchema),
        (status = 404, description = "Question not found", body = ErrorSchema)
    ),
    tags = ["questions"],
    operation_id = "closeQuestion"
)]
#[post("/questions/{id}/close")]
pub async fn close_question(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<QuestionMutationResponse>> {
    let actor = session.require_user()?;
    let id = question_id_from_path(&path)?;
    let question = state.questions.close(actor, id).await?;
    Ok(web::Json(QuestionMutationResponse {
        message: "Question closed successfully".to_owned(),
        question,
    }))
}

//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while letting Actix
//! handlers turn domain failures into consistent JSON responses and status
//! codes. Business-rule refusals and duplicate registrations are reported as
//! `400` because clients of this API only distinguish validation-style
//! failures from missing resources and authentication problems.

use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest | ErrorCode::Conflict | ErrorCode::Rejected => {
            StatusCode::BAD_REQUEST
        }
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if matches!(error.code(), ErrorCode::InternalError) {
        error!(message = error.message(), trace_id = ?error.trace_id(), "internal error");
        let mut redacted = Error::internal("Internal server error");
        if let Some(id) = error.trace_id() {
            redacted = redacted.with_trace_id(id.to_owned());
        }
        redacted
    } else {
        error.clone()
    }
}

fn respond(error: &Error, status: StatusCode) -> HttpResponse {
    let mut builder = HttpResponse::build(status);
    if let Some(id) = error.trace_id() {
        builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
    }
    builder.json(redact_if_internal(error))
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        respond(self, self.status_code())
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak implementation details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}

/// Domain error reported with `400 Bad Request` whatever its code.
///
/// Login failures keep their `not_found`/`unauthorized` codes in the body
/// but are answered with `400`, matching the registration endpoint.
#[derive(Debug)]
pub struct BadRequest(pub Error);

impl std::fmt::Display for BadRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Error> for BadRequest {
    fn from(error: Error) -> Self {
        Self(error)
    }
}

impl ResponseError for BadRequest {
    fn status_code(&self) -> StatusCode {
        match self.0.code() {
            ErrorCode::NotFound | ErrorCode::Unauthorized => StatusCode::BAD_REQUEST,
            code => status_for(code),
        }
    }

    fn error_response(&self) -> HttpResponse {
        respond(&self.0, self.status_code())
    }
}

/// Turn JSON body extraction failures into `invalid_request` payloads.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = match &err {
        JsonPayloadError::ContentType => "Request body must be JSON".to_owned(),
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            "Request body is too large".to_owned()
        }
        other => format!("Invalid request body: {other}"),
    };
    Error::invalid_request(message).into()
}

/// Turn query string extraction failures into `invalid_request` payloads.
pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("Invalid query string: {err}")).into()
}

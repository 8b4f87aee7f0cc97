//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;

/// Validation error codes reported in `details.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

/// Missing-field error with a caller-facing `message`.
pub(crate) fn missing_field_error(field: FieldName, message: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": ErrorCode::MissingField.as_str(),
    }))
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("{field} must be a valid id")).with_details(json!({
        "field": field,
        "value": value,
        "code": ErrorCode::InvalidUuid.as_str(),
    }))
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value.trim()).map_err(|_| invalid_uuid_error(field, value))
}

/// Parse a required identifier; blank or absent values report `missing`.
pub(crate) fn require_uuid(
    value: Option<&str>,
    field: FieldName,
    missing: &str,
) -> Result<Uuid, Error> {
    match value.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => parse_uuid(raw, field),
        None => Err(missing_field_error(field, missing)),
    }
}

/// Parse an optional identifier; blank values count as absent.
pub(crate) fn optional_uuid(value: Option<&str>, field: FieldName) -> Result<Option<Uuid>, Error> {
    value
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(|raw| parse_uuid(raw, field))
        .transpose()
}

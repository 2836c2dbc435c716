//! # Request Extraction Helpers
//!
//! Bodies are taken as `Result<Json<T>, JsonRejection>` so malformed JSON
//! maps to an [`AppError::BadRequest`] with the usual error body instead of
//! axum's plain-text rejection.

use agency_core::DocId;
use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::AppError;

/// Request types with rules beyond what serde checks.
pub trait Validate {
    /// Validate business rules. Returns an error message on failure.
    fn validate(&self) -> Result<(), String>;
}

/// Extract a JSON body, mapping deserialization errors to [`AppError::BadRequest`].
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract a JSON body and run its [`Validate`] rules.
pub fn extract_validated_json<T: Validate>(
    result: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let value = extract_json(result)?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}

/// Parse a path id. Malformed ids are a 400, never a 404.
pub fn parse_id(raw: &str) -> Result<DocId, AppError> {
    DocId::parse(raw).map_err(AppError::from)
}

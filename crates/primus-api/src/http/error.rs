//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use primus_types::error::{AuthError, CharacterError};
use primus_types::rules::{RuleViolation, ValidationReport};

use crate::http::response::{ApiErrorDetail, ApiResponse};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Character-related errors.
    Character(CharacterError),
    /// Authentication failure.
    Unauthorized(String),
    /// Malformed request parameter.
    BadRequest(String),
    /// Generic internal error.
    Internal(String),
}

impl From<CharacterError> for AppError {
    fn from(e: CharacterError) -> Self {
        AppError::Character(e)
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Missing => AppError::Unauthorized(
                "Missing API key. Provide via 'Authorization: Bearer <key>' or 'X-API-Key: <key>' header."
                    .to_string(),
            ),
            AuthError::Invalid => AppError::Unauthorized("Invalid API key.".to_string()),
            AuthError::StorageError(msg) => {
                tracing::error!("credential store failure: {msg}");
                AppError::Internal("credential store unavailable".to_string())
            }
        }
    }
}

/// One envelope error per violation, each naming the offending field.
pub fn violation_details(report: &ValidationReport) -> Vec<ApiErrorDetail> {
    report.violations.iter().map(violation_detail).collect()
}

fn violation_detail(violation: &RuleViolation) -> ApiErrorDetail {
    let mut details = serde_json::to_value(violation).unwrap_or_else(|_| json!({}));
    if let Some(obj) = details.as_object_mut() {
        obj.remove("code");
        obj.insert("field".to_string(), json!(violation.field()));
    }
    ApiErrorDetail {
        code: violation.code().to_string(),
        message: violation.to_string(),
        details: Some(details),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, errors) = match self {
            AppError::Character(CharacterError::Invalid(report)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                std::iter::once(ApiErrorDetail::new(
                    "VALIDATION_FAILED",
                    format!("Character failed validation: {}", report.summary()),
                ))
                .chain(violation_details(&report))
                .collect(),
            ),
            AppError::Character(CharacterError::NotFound) => (
                StatusCode::NOT_FOUND,
                vec![ApiErrorDetail::new("CHARACTER_NOT_FOUND", "Character not found")],
            ),
            AppError::Character(CharacterError::InvalidId(id)) => (
                StatusCode::BAD_REQUEST,
                vec![ApiErrorDetail::new(
                    "INVALID_ID",
                    format!("'{id}' is not a valid character id"),
                )],
            ),
            AppError::Character(CharacterError::StorageError(msg)) => {
                tracing::error!("storage failure: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    vec![ApiErrorDetail::new("STORAGE_ERROR", "Storage error")],
                )
            }
            AppError::Unauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                vec![ApiErrorDetail::new("UNAUTHORIZED", msg)],
            ),
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                vec![ApiErrorDetail::new("BAD_REQUEST", msg)],
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                vec![ApiErrorDetail::new("INTERNAL_ERROR", msg)],
            ),
        };

        (status, ApiResponse::<()>::failure(errors)).into_response()
    }
}

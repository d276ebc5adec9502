//! API error types and helpers.
//!
//! # Purpose
//! Centralizes HTTP error response construction to keep error shapes
//! uniform across registrar endpoints.
//!
//! # Key invariants
//! - Error responses carry a stable `code` and a human-readable `message`.
//! - Internal errors log details server-side and return generic messages.
use crate::api::types::ErrorResponse;
use crate::attendance::AttendanceError;
use crate::registration::{FieldViolation, RegistrationError};
use crate::store::StoreError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;

/// Structured API error returned by handlers. Couples an HTTP status code
/// with a JSON error body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.body)).into_response()
    }
}

fn api_error(status: StatusCode, code: &str, message: &str) -> ApiError {
    ApiError {
        status,
        body: ErrorResponse {
            code: code.to_string(),
            message: message.to_string(),
            request_id: None,
        },
    }
}

pub fn api_unauthorized(message: &str) -> ApiError {
    api_error(StatusCode::UNAUTHORIZED, "unauthenticated", message)
}

pub fn api_forbidden(message: &str) -> ApiError {
    api_error(StatusCode::FORBIDDEN, "forbidden", message)
}

pub fn api_not_found(message: &str) -> ApiError {
    api_error(StatusCode::NOT_FOUND, "not_found", message)
}

pub fn api_conflict(message: &str) -> ApiError {
    api_error(StatusCode::CONFLICT, "already_registered", message)
}

pub fn api_unprocessable(code: &str, message: &str) -> ApiError {
    api_error(StatusCode::UNPROCESSABLE_ENTITY, code, message)
}

/// 422 listing every violated field, not just the first.
pub fn api_validation(violations: &[FieldViolation]) -> ApiError {
    let message = violations
        .iter()
        .map(|violation| format!("{}: {}", violation.field, violation.message))
        .collect::<Vec<_>>()
        .join("; ");
    api_error(
        StatusCode::UNPROCESSABLE_ENTITY,
        "validation_error",
        &message,
    )
}

/// Build a 500 from an internal failure, logging the detail server-side and
/// returning only the context string to the caller.
pub fn api_internal(context: &str, err: &dyn std::fmt::Display) -> ApiError {
    tracing::error!(error = %err, "{context}");
    api_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", context)
}

pub fn api_internal_message(message: &str) -> ApiError {
    api_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
}

/// Translate orchestrator failures. The partially-landed dual write gets
/// its own code so callers can tell "retry with fixed input" apart from
/// "a half-registered pair needs manual reconciliation".
pub(crate) fn registration_error(err: RegistrationError) -> ApiError {
    match err {
        RegistrationError::Validation(violations) => api_validation(&violations),
        RegistrationError::AlreadyRegistered => {
            api_conflict("external id or email already registered")
        }
        RegistrationError::Partial(partial) => ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorResponse {
                code: "partial_registration".to_string(),
                message: partial.to_string(),
                request_id: None,
            },
        },
        RegistrationError::Store(StoreError::NotFound(detail)) => api_not_found(&detail),
        RegistrationError::Store(StoreError::Conflict(detail)) => api_conflict(&detail),
        RegistrationError::Store(err) => api_internal("registration failed", &err),
    }
}

/// Translate attendance engine failures.
pub(crate) fn attendance_error(err: AttendanceError) -> ApiError {
    match err {
        AttendanceError::InvalidInput(detail) => api_unprocessable("validation_error", &detail),
        AttendanceError::CourseNotFound(course) => {
            api_not_found(&format!("course not found: {course}"))
        }
        AttendanceError::NotAssigned { course, .. } => {
            api_forbidden(&format!("course {course} is not assigned to caller"))
        }
        AttendanceError::NotEnrolled(student_id) => api_unprocessable(
            "student_not_enrolled",
            &format!("student {student_id} is not enrolled in the course"),
        ),
        AttendanceError::Store(StoreError::NotFound(detail)) => api_not_found(&detail),
        AttendanceError::Store(StoreError::Conflict(detail)) => api_conflict(&detail),
        AttendanceError::Store(err) => api_internal("attendance operation failed", &err),
    }
}

//! Student API handlers.
//!
//! # Purpose
//! Admin-gated registration and listing, plus the self-scoped profile read.
use crate::api::error::{ApiError, api_internal, api_not_found, registration_error};
use crate::api::types::{RegisterStudentRequest, StudentListResponse};
use crate::app::AppState;
use crate::auth::gate::{authorize, ensure_self};
use crate::model::{Role, StudentProfile};
use crate::registration::{StudentDraft, register_student as orchestrate};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use std::collections::HashMap;

#[utoipa::path(
    post,
    path = "/v1/students",
    tag = "students",
    request_body = RegisterStudentRequest,
    responses(
        (status = 201, description = "Student registered", body = StudentProfile),
        (status = 409, description = "External id or email already registered", body = crate::api::types::ErrorResponse),
        (status = 422, description = "Validation failed", body = crate::api::types::ErrorResponse),
        (status = 500, description = "Dual write landed partially", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn register_student(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<RegisterStudentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, &headers, &[Role::Admin])?;
    let draft = StudentDraft {
        student_id: body.student_id,
        display_name: body.display_name,
        email: body.email,
        password: body.password,
        department: body.department,
        contact_info: body.contact_info,
        enroll_in: body.enroll_in,
    };
    let (_, profile) = orchestrate(state.store.as_ref(), draft)
        .await
        .map_err(registration_error)?;
    Ok((StatusCode::CREATED, Json(profile)))
}

#[utoipa::path(
    get,
    path = "/v1/students",
    tag = "students",
    params(
        ("department" = Option<String>, Query, description = "Department filter")
    ),
    responses(
        (status = 200, description = "List students", body = StudentListResponse)
    )
)]
pub(crate) async fn list_students(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<StudentListResponse>, ApiError> {
    authorize(&state, &headers, &[Role::Admin])?;
    let department = params.get("department").map(String::as_str);
    let items = state
        .store
        .list_students(department)
        .await
        .map_err(|err| api_internal("failed to list students", &err))?;
    // No matches is an empty success, never an error.
    Ok(Json(StudentListResponse { items }))
}

#[utoipa::path(
    get,
    path = "/v1/students/{student_id}",
    tag = "students",
    params(
        ("student_id" = String, Path, description = "Student identifier")
    ),
    responses(
        (status = 200, description = "Own student profile", body = StudentProfile),
        (status = 403, description = "Profile owned by someone else", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Student not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn get_student(
    Path(student_id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<StudentProfile>, ApiError> {
    let claims = authorize(&state, &headers, &[Role::Student])?;
    let profile = state
        .store
        .find_student(&student_id)
        .await
        .map_err(|err| api_internal("failed to load student", &err))?
        .ok_or_else(|| api_not_found("student not found"))?;
    // Same role is not enough: the path id must belong to the caller.
    ensure_self(&claims, &profile.email)?;
    Ok(Json(profile))
}

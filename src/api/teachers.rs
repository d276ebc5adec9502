//! Teacher API handlers.
//!
//! # Purpose
//! Admin-gated registration, listing and deregistration, plus the
//! self-scoped profile read.
use crate::api::error::{ApiError, api_internal, api_not_found, registration_error};
use crate::api::types::{RegisterTeacherRequest, TeacherListResponse};
use crate::app::AppState;
use crate::auth::gate::{authorize, ensure_self};
use crate::model::{Role, TeacherProfile};
use crate::registration::{TeacherDraft, deregister_teacher, register_teacher as orchestrate};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use std::collections::HashMap;

#[utoipa::path(
    post,
    path = "/v1/teachers",
    tag = "teachers",
    request_body = RegisterTeacherRequest,
    responses(
        (status = 201, description = "Teacher registered", body = TeacherProfile),
        (status = 409, description = "External id or email already registered", body = crate::api::types::ErrorResponse),
        (status = 422, description = "Validation failed", body = crate::api::types::ErrorResponse),
        (status = 500, description = "Dual write landed partially", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn register_teacher(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<RegisterTeacherRequest>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, &headers, &[Role::Admin])?;
    let draft = TeacherDraft {
        teacher_id: body.teacher_id,
        display_name: body.display_name,
        email: body.email,
        password: body.password,
        department: body.department,
        contact_info: body.contact_info,
        position: body.position,
        salary: body.salary,
    };
    let (_, profile) = orchestrate(state.store.as_ref(), draft)
        .await
        .map_err(registration_error)?;
    Ok((StatusCode::CREATED, Json(profile)))
}

#[utoipa::path(
    get,
    path = "/v1/teachers",
    tag = "teachers",
    params(
        ("department" = Option<String>, Query, description = "Department filter")
    ),
    responses(
        (status = 200, description = "List teachers", body = TeacherListResponse)
    )
)]
pub(crate) async fn list_teachers(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TeacherListResponse>, ApiError> {
    authorize(&state, &headers, &[Role::Admin])?;
    let department = params.get("department").map(String::as_str);
    let items = state
        .store
        .list_teachers(department)
        .await
        .map_err(|err| api_internal("failed to list teachers", &err))?;
    Ok(Json(TeacherListResponse { items }))
}

#[utoipa::path(
    get,
    path = "/v1/teachers/{teacher_id}",
    tag = "teachers",
    params(
        ("teacher_id" = String, Path, description = "Teacher identifier")
    ),
    responses(
        (status = 200, description = "Own teacher profile", body = TeacherProfile),
        (status = 403, description = "Profile owned by someone else", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Teacher not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn get_teacher(
    Path(teacher_id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TeacherProfile>, ApiError> {
    let claims = authorize(&state, &headers, &[Role::Teacher])?;
    let profile = state
        .store
        .find_teacher(&teacher_id)
        .await
        .map_err(|err| api_internal("failed to load teacher", &err))?
        .ok_or_else(|| api_not_found("teacher not found"))?;
    ensure_self(&claims, &profile.email)?;
    Ok(Json(profile))
}

#[utoipa::path(
    delete,
    path = "/v1/teachers/{teacher_id}",
    tag = "teachers",
    params(
        ("teacher_id" = String, Path, description = "Teacher identifier")
    ),
    responses(
        (status = 204, description = "Teacher deregistered"),
        (status = 404, description = "Teacher not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn delete_teacher(
    Path(teacher_id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    authorize(&state, &headers, &[Role::Admin])?;
    deregister_teacher(state.store.as_ref(), &teacher_id)
        .await
        .map_err(registration_error)?;
    Ok(StatusCode::NO_CONTENT)
}

//! Attendance API handlers.
//!
//! # Purpose
//! Teacher-gated sheet submission, ledger read-back, and the assigned
//! roster.
use crate::api::error::{
    ApiError, api_forbidden, api_internal, api_not_found, api_unprocessable, attendance_error,
};
use crate::api::types::{
    AttendanceListResponse, AttendanceSaveResponse, AttendanceSheetRequest, RosterResponse,
};
use crate::api::require_teacher_profile;
use crate::app::AppState;
use crate::attendance::{assigned_roster, save_attendance as reconcile};
use crate::auth::gate::authorize;
use crate::model::Role;
use axum::Json;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use chrono::NaiveDate;
use std::collections::HashMap;

#[utoipa::path(
    post,
    path = "/v1/attendance",
    tag = "attendance",
    request_body = AttendanceSheetRequest,
    responses(
        (status = 200, description = "Sheet saved", body = AttendanceSaveResponse),
        (status = 403, description = "Course not assigned to caller", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Course not found", body = crate::api::types::ErrorResponse),
        (status = 422, description = "Invalid sheet or non-enrolled student", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn save_attendance(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<AttendanceSheetRequest>,
) -> Result<Json<AttendanceSaveResponse>, ApiError> {
    let claims = authorize(&state, &headers, &[Role::Teacher])?;
    let teacher = require_teacher_profile(&state, &claims).await?;
    let saved = reconcile(
        state.store.as_ref(),
        &teacher,
        &body.course_code,
        body.date,
        &body.records,
    )
    .await
    .map_err(attendance_error)?;
    Ok(Json(AttendanceSaveResponse { saved }))
}

#[utoipa::path(
    get,
    path = "/v1/attendance",
    tag = "attendance",
    params(
        ("course" = String, Query, description = "Course code"),
        ("date" = String, Query, description = "Calendar day, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Ledger entries for the day", body = AttendanceListResponse),
        (status = 403, description = "Course not assigned to caller", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Course not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn list_attendance(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AttendanceListResponse>, ApiError> {
    let claims = authorize(&state, &headers, &[Role::Teacher])?;
    let teacher = require_teacher_profile(&state, &claims).await?;
    let course_code = params
        .get("course")
        .ok_or_else(|| api_unprocessable("validation_error", "course query parameter required"))?;
    let date = params
        .get("date")
        .and_then(|value| NaiveDate::parse_from_str(value, "%Y-%m-%d").ok())
        .ok_or_else(|| {
            api_unprocessable("validation_error", "date query parameter must be YYYY-MM-DD")
        })?;

    let course = state
        .store
        .find_course(course_code)
        .await
        .map_err(|err| api_internal("failed to load course", &err))?
        .ok_or_else(|| api_not_found("course not found"))?;
    if course.teacher_id != teacher.teacher_id {
        return Err(api_forbidden("course not assigned to caller"));
    }

    let mut items = state
        .store
        .list_attendance(course_code, date)
        .await
        .map_err(|err| api_internal("failed to list attendance", &err))?;
    // Entries recorded by a previous assignee stay hidden from the current
    // one; the ledger key includes the recording teacher.
    items.retain(|entry| entry.teacher_id == teacher.teacher_id);
    Ok(Json(AttendanceListResponse { items }))
}

#[utoipa::path(
    get,
    path = "/v1/roster",
    tag = "attendance",
    responses(
        (status = 200, description = "Courses and enrolled students for the caller", body = RosterResponse)
    )
)]
pub(crate) async fn get_roster(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RosterResponse>, ApiError> {
    let claims = authorize(&state, &headers, &[Role::Teacher])?;
    let teacher = require_teacher_profile(&state, &claims).await?;
    let roster = assigned_roster(state.store.as_ref(), &teacher.teacher_id)
        .await
        .map_err(attendance_error)?;
    Ok(Json(RosterResponse {
        courses: roster.courses,
        students: roster.students,
    }))
}

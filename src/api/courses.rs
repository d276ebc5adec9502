//! Course API handlers.
//!
//! # Purpose
//! Admin-gated course creation and enrollment; listing for admins and
//! teachers.
use crate::api::error::{
    ApiError, api_conflict, api_internal, api_not_found, api_validation,
};
use crate::api::types::{CourseCreateRequest, CourseListResponse, EnrollRequest};
use crate::app::AppState;
use crate::auth::gate::authorize;
use crate::model::{Course, EnrollmentRecord, EnrollmentStatus, Role, StudentProfile};
use crate::registration::FieldViolation;
use crate::store::StoreError;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

#[utoipa::path(
    post,
    path = "/v1/courses",
    tag = "courses",
    request_body = CourseCreateRequest,
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 404, description = "Assigned teacher not registered", body = crate::api::types::ErrorResponse),
        (status = 409, description = "Course code already exists", body = crate::api::types::ErrorResponse),
        (status = 422, description = "Validation failed", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn create_course(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CourseCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&state, &headers, &[Role::Admin])?;
    let mut violations = Vec::new();
    for (field, value) in [
        ("course_code", &body.course_code),
        ("course_name", &body.course_name),
        ("teacher_id", &body.teacher_id),
        ("department", &body.department),
    ] {
        if value.trim().is_empty() {
            violations.push(FieldViolation {
                field,
                message: "must not be empty".to_string(),
            });
        }
    }
    if !violations.is_empty() {
        return Err(api_validation(&violations));
    }

    // The assignment relationship needs a registered teacher on the other
    // end before the attendance engine will ever authorize against it.
    let teacher = state
        .store
        .find_teacher(&body.teacher_id)
        .await
        .map_err(|err| api_internal("failed to load teacher", &err))?
        .ok_or_else(|| api_not_found("assigned teacher not registered"))?;

    let course = Course {
        course_code: body.course_code,
        course_name: body.course_name,
        description: body.description,
        teacher_id: teacher.teacher_id.clone(),
        department: body.department,
        enrolled_students: Vec::new(),
    };
    let course = match state.store.create_course(course).await {
        Ok(course) => course,
        Err(StoreError::Conflict(detail)) => return Err(api_conflict(&detail)),
        Err(err) => return Err(api_internal("failed to create course", &err)),
    };

    // Mirror the assignment onto the teacher profile; the course document
    // stays authoritative if this second write is lost.
    if let Err(err) = state
        .store
        .add_teacher_course(&teacher.teacher_id, &course.course_code)
        .await
    {
        tracing::warn!(course = %course.course_code, teacher = %teacher.teacher_id, error = %err,
            "failed to mirror course assignment onto teacher profile");
    }
    Ok((StatusCode::CREATED, Json(course)))
}

#[utoipa::path(
    get,
    path = "/v1/courses",
    tag = "courses",
    responses(
        (status = 200, description = "List courses", body = CourseListResponse)
    )
)]
pub(crate) async fn list_courses(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CourseListResponse>, ApiError> {
    authorize(&state, &headers, &[Role::Admin, Role::Teacher])?;
    let items = state
        .store
        .list_courses()
        .await
        .map_err(|err| api_internal("failed to list courses", &err))?;
    Ok(Json(CourseListResponse { items }))
}

#[utoipa::path(
    post,
    path = "/v1/courses/{course_code}/enrollments",
    tag = "courses",
    params(
        ("course_code" = String, Path, description = "Course code")
    ),
    request_body = EnrollRequest,
    responses(
        (status = 200, description = "Student enrolled", body = StudentProfile),
        (status = 404, description = "Course or student not found", body = crate::api::types::ErrorResponse),
        (status = 409, description = "Student already enrolled", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn enroll_student(
    Path(course_code): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<EnrollRequest>,
) -> Result<Json<StudentProfile>, ApiError> {
    authorize(&state, &headers, &[Role::Admin])?;
    let course = state
        .store
        .find_course(&course_code)
        .await
        .map_err(|err| api_internal("failed to load course", &err))?
        .ok_or_else(|| api_not_found("course not found"))?;

    let record = EnrollmentRecord {
        course_code: course.course_code.clone(),
        enrolled_at: chrono::Utc::now().timestamp(),
        status: EnrollmentStatus::Enrolled,
    };
    let profile = match state.store.add_enrollment(&body.student_id, record).await {
        Ok(profile) => profile,
        Err(StoreError::NotFound(detail)) => return Err(api_not_found(&detail)),
        Err(StoreError::Conflict(detail)) => return Err(api_conflict(&detail)),
        Err(err) => return Err(api_internal("failed to enroll student", &err)),
    };

    // Second, non-transactional write onto the course document. The
    // student-side enrollment list is what attendance validates against.
    if let Err(err) = state
        .store
        .add_course_student(&course.course_code, &profile.student_id)
        .await
    {
        tracing::warn!(course = %course.course_code, student = %profile.student_id, error = %err,
            "failed to mirror enrollment onto course");
    }
    Ok(Json(profile))
}

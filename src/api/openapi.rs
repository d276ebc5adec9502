//! OpenAPI schema aggregation for the registrar API.
//!
//! # Purpose
//! Collects all routes and schema types into a single OpenAPI document for
//! docs and client generation.
use crate::api::{
    attendance, courses, identity, students, system, teachers,
    types::{
        AttendanceListResponse, AttendanceSaveResponse, AttendanceSheetRequest,
        CourseCreateRequest, CourseListResponse, EnrollRequest, ErrorResponse, HealthStatus,
        RegisterStudentRequest, RegisterTeacherRequest, RosterResponse, StudentListResponse,
        SystemInfo, TeacherListResponse,
    },
};
use crate::auth::login::{self, LoginRequest, LoginResponse, PasswordChangeRequest};
use crate::model::{
    AttendanceKey, AttendanceMark, AttendanceRecord, AttendanceStatus, Course, EnrollmentRecord,
    EnrollmentStatus, Identity, IdentityPatch, ProfileStatus, Role, StudentProfile, TeacherProfile,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "registrar",
        version = "v1",
        description = "University registrar HTTP API"
    ),
    paths(
        system::system_info,
        system::system_health,
        login::login,
        login::change_password,
        identity::get_identity,
        identity::update_identity,
        students::register_student,
        students::list_students,
        students::get_student,
        teachers::register_teacher,
        teachers::list_teachers,
        teachers::get_teacher,
        teachers::delete_teacher,
        courses::create_course,
        courses::list_courses,
        courses::enroll_student,
        attendance::save_attendance,
        attendance::list_attendance,
        attendance::get_roster
    ),
    components(schemas(
        ErrorResponse,
        SystemInfo,
        HealthStatus,
        LoginRequest,
        LoginResponse,
        PasswordChangeRequest,
        Identity,
        IdentityPatch,
        Role,
        ProfileStatus,
        StudentProfile,
        EnrollmentRecord,
        EnrollmentStatus,
        TeacherProfile,
        Course,
        RegisterStudentRequest,
        RegisterTeacherRequest,
        StudentListResponse,
        TeacherListResponse,
        CourseCreateRequest,
        CourseListResponse,
        EnrollRequest,
        RosterResponse,
        AttendanceSheetRequest,
        AttendanceSaveResponse,
        AttendanceListResponse,
        AttendanceMark,
        AttendanceRecord,
        AttendanceKey,
        AttendanceStatus
    )),
    tags(
        (name = "system", description = "System and discovery endpoints"),
        (name = "auth", description = "Login and password management"),
        (name = "identity", description = "Own account identity"),
        (name = "students", description = "Student registration and profiles"),
        (name = "teachers", description = "Teacher registration and profiles"),
        (name = "courses", description = "Course management and enrollment"),
        (name = "attendance", description = "Attendance sheets and rosters")
    )
)]
pub struct ApiDoc;

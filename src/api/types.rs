//! HTTP API request/response types.
//!
//! # Purpose
//! Defines shared payload shapes for the registrar REST API and OpenAPI
//! schema generation.
use crate::model::{AttendanceMark, AttendanceRecord, Course, StudentProfile, TeacherProfile};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub request_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct SystemInfo {
    pub service: String,
    pub api_version: String,
    pub storage_backend: String,
    pub durable_storage: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct HealthStatus {
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema, Clone)]
pub struct RegisterStudentRequest {
    pub student_id: String,
    pub display_name: String,
    pub email: String,
    pub password: String,
    pub department: String,
    #[serde(default)]
    pub contact_info: String,
    /// Course codes to enroll in as part of registration.
    #[serde(default)]
    pub enroll_in: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema, Clone)]
pub struct RegisterTeacherRequest {
    pub teacher_id: String,
    pub display_name: String,
    pub email: String,
    pub password: String,
    pub department: String,
    #[serde(default)]
    pub contact_info: String,
    pub position: String,
    pub salary: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct StudentListResponse {
    pub items: Vec<StudentProfile>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct TeacherListResponse {
    pub items: Vec<TeacherProfile>,
}

#[derive(Debug, Deserialize, ToSchema, Clone)]
pub struct CourseCreateRequest {
    pub course_code: String,
    pub course_name: String,
    #[serde(default)]
    pub description: String,
    pub teacher_id: String,
    pub department: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct CourseListResponse {
    pub items: Vec<Course>,
}

#[derive(Debug, Deserialize, ToSchema, Clone)]
pub struct EnrollRequest {
    pub student_id: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct RosterResponse {
    pub courses: Vec<Course>,
    pub students: Vec<StudentProfile>,
}

#[derive(Debug, Deserialize, ToSchema, Clone)]
pub struct AttendanceSheetRequest {
    pub course_code: String,
    pub date: NaiveDate,
    pub records: Vec<AttendanceMark>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct AttendanceSaveResponse {
    pub saved: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct AttendanceListResponse {
    pub items: Vec<AttendanceRecord>,
}

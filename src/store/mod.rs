use crate::model::{
    AttendanceRecord, Course, EnrollmentRecord, Identity, IdentityPatch, Role, StudentProfile,
    TeacherProfile,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

pub mod memory;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Document-store surface consumed by the orchestrators and handlers.
///
/// Each method is a single-document operation (atomic per document);
/// uniqueness constraints are enforced at insert and are the authoritative
/// guard against duplicate registration. Multi-document flows (identity +
/// profile, enrollment both sides) are composed above this trait and are
/// deliberately not transactional.
#[async_trait]
pub trait RegistrarStore: Send + Sync {
    async fn create_identity(&self, identity: Identity) -> StoreResult<Identity>;
    async fn find_identity(&self, email: &str) -> StoreResult<Option<Identity>>;
    async fn update_identity(&self, email: &str, patch: IdentityPatch) -> StoreResult<Identity>;
    async fn set_password_hash(&self, email: &str, hash: String) -> StoreResult<()>;
    async fn delete_identity(&self, email: &str) -> StoreResult<()>;

    async fn create_student(&self, profile: StudentProfile) -> StoreResult<StudentProfile>;
    async fn find_student(&self, student_id: &str) -> StoreResult<Option<StudentProfile>>;
    async fn find_student_by_email(&self, email: &str) -> StoreResult<Option<StudentProfile>>;
    async fn list_students(&self, department: Option<&str>) -> StoreResult<Vec<StudentProfile>>;
    async fn add_enrollment(
        &self,
        student_id: &str,
        record: EnrollmentRecord,
    ) -> StoreResult<StudentProfile>;

    async fn create_teacher(&self, profile: TeacherProfile) -> StoreResult<TeacherProfile>;
    async fn find_teacher(&self, teacher_id: &str) -> StoreResult<Option<TeacherProfile>>;
    async fn find_teacher_by_email(&self, email: &str) -> StoreResult<Option<TeacherProfile>>;
    async fn list_teachers(&self, department: Option<&str>) -> StoreResult<Vec<TeacherProfile>>;
    async fn delete_teacher(&self, teacher_id: &str) -> StoreResult<()>;
    async fn add_teacher_course(&self, teacher_id: &str, course_code: &str) -> StoreResult<()>;

    async fn create_course(&self, course: Course) -> StoreResult<Course>;
    async fn find_course(&self, course_code: &str) -> StoreResult<Option<Course>>;
    async fn list_courses(&self) -> StoreResult<Vec<Course>>;
    async fn courses_by_teacher(&self, teacher_id: &str) -> StoreResult<Vec<Course>>;
    async fn add_course_student(&self, course_code: &str, student_id: &str) -> StoreResult<()>;

    async fn upsert_attendance(&self, record: AttendanceRecord) -> StoreResult<()>;
    async fn list_attendance(
        &self,
        course_code: &str,
        date: NaiveDate,
    ) -> StoreResult<Vec<AttendanceRecord>>;

    /// Rewrite the email back-reference on the role profile paired with an
    /// identity whose email changed. A role with no profile store (admin)
    /// or no matching profile is a no-op.
    async fn update_profile_email(
        &self,
        role: Role,
        old_email: &str,
        new_email: &str,
    ) -> StoreResult<()>;

    async fn health_check(&self) -> StoreResult<()>;
    fn is_durable(&self) -> bool;
    fn backend_name(&self) -> &'static str;
}

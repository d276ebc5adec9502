mod common;
mod http_helpers;

use async_trait::async_trait;
use axum::http::StatusCode;
use chrono::NaiveDate;
use common::{read_json, state_with_store};
use http_helpers::authed_json_request;
use registrar::app::build_router;
use registrar::auth::token::{DEFAULT_TOKEN_TTL, TokenKeys, issue};
use registrar::model::{
    AttendanceRecord, Course, EnrollmentRecord, Identity, IdentityPatch, Role, StudentProfile,
    TeacherProfile,
};
use registrar::registration::{RegistrationError, StudentDraft, register_student};
use registrar::store::memory::InMemoryStore;
use registrar::store::{RegistrarStore, StoreError, StoreResult};
use std::sync::Arc;
use tower::ServiceExt;

/// Store stub that simulates losing the identity side of the dual write:
/// every identity insert hits a conflict (as a racing create would), while
/// everything else delegates to a healthy in-memory store.
struct IdentityConflictStore {
    inner: InMemoryStore,
}

impl IdentityConflictStore {
    fn new() -> Self {
        Self {
            inner: InMemoryStore::new(),
        }
    }
}

#[async_trait]
impl RegistrarStore for IdentityConflictStore {
    async fn create_identity(&self, identity: Identity) -> StoreResult<Identity> {
        Err(StoreError::Conflict(format!(
            "identity already exists: {}",
            identity.email
        )))
    }

    async fn find_identity(&self, email: &str) -> StoreResult<Option<Identity>> {
        self.inner.find_identity(email).await
    }

    async fn update_identity(&self, email: &str, patch: IdentityPatch) -> StoreResult<Identity> {
        self.inner.update_identity(email, patch).await
    }

    async fn set_password_hash(&self, email: &str, hash: String) -> StoreResult<()> {
        self.inner.set_password_hash(email, hash).await
    }

    async fn delete_identity(&self, email: &str) -> StoreResult<()> {
        self.inner.delete_identity(email).await
    }

    async fn create_student(&self, profile: StudentProfile) -> StoreResult<StudentProfile> {
        self.inner.create_student(profile).await
    }

    async fn find_student(&self, student_id: &str) -> StoreResult<Option<StudentProfile>> {
        self.inner.find_student(student_id).await
    }

    async fn find_student_by_email(&self, email: &str) -> StoreResult<Option<StudentProfile>> {
        self.inner.find_student_by_email(email).await
    }

    async fn list_students(&self, department: Option<&str>) -> StoreResult<Vec<StudentProfile>> {
        self.inner.list_students(department).await
    }

    async fn add_enrollment(
        &self,
        student_id: &str,
        record: EnrollmentRecord,
    ) -> StoreResult<StudentProfile> {
        self.inner.add_enrollment(student_id, record).await
    }

    async fn create_teacher(&self, profile: TeacherProfile) -> StoreResult<TeacherProfile> {
        self.inner.create_teacher(profile).await
    }

    async fn find_teacher(&self, teacher_id: &str) -> StoreResult<Option<TeacherProfile>> {
        self.inner.find_teacher(teacher_id).await
    }

    async fn find_teacher_by_email(&self, email: &str) -> StoreResult<Option<TeacherProfile>> {
        self.inner.find_teacher_by_email(email).await
    }

    async fn list_teachers(&self, department: Option<&str>) -> StoreResult<Vec<TeacherProfile>> {
        self.inner.list_teachers(department).await
    }

    async fn delete_teacher(&self, teacher_id: &str) -> StoreResult<()> {
        self.inner.delete_teacher(teacher_id).await
    }

    async fn add_teacher_course(&self, teacher_id: &str, course_code: &str) -> StoreResult<()> {
        self.inner.add_teacher_course(teacher_id, course_code).await
    }

    async fn create_course(&self, course: Course) -> StoreResult<Course> {
        self.inner.create_course(course).await
    }

    async fn find_course(&self, course_code: &str) -> StoreResult<Option<Course>> {
        self.inner.find_course(course_code).await
    }

    async fn list_courses(&self) -> StoreResult<Vec<Course>> {
        self.inner.list_courses().await
    }

    async fn courses_by_teacher(&self, teacher_id: &str) -> StoreResult<Vec<Course>> {
        self.inner.courses_by_teacher(teacher_id).await
    }

    async fn add_course_student(&self, course_code: &str, student_id: &str) -> StoreResult<()> {
        self.inner.add_course_student(course_code, student_id).await
    }

    async fn upsert_attendance(&self, record: AttendanceRecord) -> StoreResult<()> {
        self.inner.upsert_attendance(record).await
    }

    async fn list_attendance(
        &self,
        course_code: &str,
        date: NaiveDate,
    ) -> StoreResult<Vec<AttendanceRecord>> {
        self.inner.list_attendance(course_code, date).await
    }

    async fn update_profile_email(
        &self,
        role: Role,
        old_email: &str,
        new_email: &str,
    ) -> StoreResult<()> {
        self.inner
            .update_profile_email(role, old_email, new_email)
            .await
    }

    async fn health_check(&self) -> StoreResult<()> {
        self.inner.health_check().await
    }

    fn is_durable(&self) -> bool {
        false
    }

    fn backend_name(&self) -> &'static str {
        "identity-conflict"
    }
}

fn draft() -> StudentDraft {
    StudentDraft {
        student_id: "CS_STU_001".to_string(),
        display_name: "Ada Lovelace".to_string(),
        email: "ada@example.edu".to_string(),
        password: "student-password".to_string(),
        department: "CS".to_string(),
        contact_info: "555-0100".to_string(),
        enroll_in: Vec::new(),
    }
}

#[tokio::test]
async fn lost_identity_write_surfaces_as_partial_registration() {
    let store = IdentityConflictStore::new();
    let err = register_student(&store, draft()).await.unwrap_err();
    let RegistrationError::Partial(partial) = err else {
        panic!("expected partial registration, got {err:?}");
    };
    assert!(!partial.identity_created);
    assert!(partial.profile_created);
    assert!(partial.to_string().contains("role profile"));

    // The profile side really landed; that is the inconsistency the error
    // is telling the admin to reconcile.
    let profile = store
        .find_student("CS_STU_001")
        .await
        .expect("find")
        .expect("profile landed");
    assert_eq!(profile.email, "ada@example.edu");
}

#[tokio::test]
async fn partial_registration_has_its_own_http_error_code() {
    let state = state_with_store(Arc::new(IdentityConflictStore::new()));
    let keys = TokenKeys::from_seed(&common::TEST_SEED).expect("keys");
    let admin = Identity {
        email: "admin@example.edu".to_string(),
        display_name: "Administrator".to_string(),
        password_hash: String::new(),
        role: Role::Admin,
        profile_image: None,
        preferences: serde_json::json!({}),
    };
    let token = issue(&keys, &admin, DEFAULT_TOKEN_TTL).expect("token");
    let app = build_router(state).into_service();

    let request = authed_json_request(
        "POST",
        "/v1/students",
        &token,
        serde_json::json!({
            "student_id": "CS_STU_001",
            "display_name": "Ada Lovelace",
            "email": "ada@example.edu",
            "password": "student-password",
            "department": "CS"
        }),
    );
    let response = app.clone().oneshot(request).await.expect("register");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let payload = read_json(response).await;
    assert_eq!(payload["code"], "partial_registration");
    assert!(
        payload["message"]
            .as_str()
            .expect("message")
            .contains("role profile")
    );
}

use axum::body::Body;
use registrar::app::{AppState, build_router};
use registrar::auth::password::hash_password;
use registrar::auth::token::TokenKeys;
use registrar::model::{Identity, Role};
use registrar::store::RegistrarStore;
use registrar::store::memory::InMemoryStore;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "admin@example.edu";
pub const ADMIN_PASSWORD: &str = "admin-password";
pub const TEST_SEED: [u8; 32] = [7u8; 32];

pub type TestApp = axum::routing::RouterIntoService<Body, ()>;

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

pub fn state_with_store(store: Arc<dyn registrar::store::RegistrarStore + Send + Sync>) -> AppState {
    AppState {
        store,
        keys: Arc::new(TokenKeys::from_seed(&TEST_SEED).expect("keys")),
        token_ttl: Duration::from_secs(3600),
        api_version: "v1".to_string(),
    }
}

/// Router over a fresh in-memory store with the test admin identity seeded.
pub async fn test_app() -> TestApp {
    let store = InMemoryStore::new();
    let hash = hash_password(ADMIN_PASSWORD).expect("hash");
    store
        .create_identity(Identity {
            email: ADMIN_EMAIL.to_string(),
            display_name: "Administrator".to_string(),
            password_hash: hash,
            role: Role::Admin,
            profile_image: None,
            preferences: serde_json::json!({}),
        })
        .await
        .expect("seed admin");
    build_router(state_with_store(Arc::new(store))).into_service()
}

pub async fn login(app: &TestApp, email: &str, password: &str) -> String {
    let request = crate::http_helpers::json_request(
        "POST",
        "/v1/auth/login",
        serde_json::json!({ "email": email, "password": password }),
    );
    let response = app.clone().oneshot(request).await.expect("login");
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    let payload = read_json(response).await;
    payload["token"].as_str().expect("token").to_string()
}

pub async fn register_teacher(app: &TestApp, admin_token: &str, teacher_id: &str, email: &str) {
    let request = crate::http_helpers::authed_json_request(
        "POST",
        "/v1/teachers",
        admin_token,
        serde_json::json!({
            "teacher_id": teacher_id,
            "display_name": "Grace Hopper",
            "email": email,
            "password": "teacher-password",
            "department": "CS",
            "contact_info": "555-0101",
            "position": "Professor",
            "salary": 90000
        }),
    );
    let response = app.clone().oneshot(request).await.expect("teacher");
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
}

pub async fn register_student(
    app: &TestApp,
    admin_token: &str,
    student_id: &str,
    email: &str,
    enroll_in: &[&str],
) {
    let request = crate::http_helpers::authed_json_request(
        "POST",
        "/v1/students",
        admin_token,
        serde_json::json!({
            "student_id": student_id,
            "display_name": "Ada Lovelace",
            "email": email,
            "password": "student-password",
            "department": "CS",
            "contact_info": "555-0100",
            "enroll_in": enroll_in
        }),
    );
    let response = app.clone().oneshot(request).await.expect("student");
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
}

pub async fn create_course(app: &TestApp, admin_token: &str, course_code: &str, teacher_id: &str) {
    let request = crate::http_helpers::authed_json_request(
        "POST",
        "/v1/courses",
        admin_token,
        serde_json::json!({
            "course_code": course_code,
            "course_name": "Introduction",
            "description": "Introductory course",
            "teacher_id": teacher_id,
            "department": "CS"
        }),
    );
    let response = app.clone().oneshot(request).await.expect("course");
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
}

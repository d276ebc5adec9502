mod common;
mod http_helpers;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{ADMIN_EMAIL, ADMIN_PASSWORD, login, read_json, register_student, test_app};
use http_helpers::{authed_json_request, authed_request, json_request};
use tower::ServiceExt;

#[tokio::test]
async fn login_returns_credential_and_public_identity_fields() {
    let app = test_app().await;
    let request = json_request(
        "POST",
        "/v1/auth/login",
        serde_json::json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
    );
    let response = app.clone().oneshot(request).await.expect("login");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert!(!payload["token"].as_str().expect("token").is_empty());
    assert_eq!(payload["token_type"], "Bearer");
    assert_eq!(payload["email"], ADMIN_EMAIL);
    assert_eq!(payload["role"], "admin");
    assert!(payload.get("password_hash").is_none());
}

#[tokio::test]
async fn login_rejects_wrong_password_and_unknown_email_identically() {
    let app = test_app().await;

    let wrong_password = json_request(
        "POST",
        "/v1/auth/login",
        serde_json::json!({ "email": ADMIN_EMAIL, "password": "nope" }),
    );
    let response = app.clone().oneshot(wrong_password).await.expect("login");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let wrong_password_body = read_json(response).await;

    let unknown_email = json_request(
        "POST",
        "/v1/auth/login",
        serde_json::json!({ "email": "ghost@example.edu", "password": "nope" }),
    );
    let response = app.clone().oneshot(unknown_email).await.expect("login");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let unknown_email_body = read_json(response).await;

    // Same code and message for both, so responses do not reveal whether an
    // email is registered.
    assert_eq!(wrong_password_body["message"], unknown_email_body["message"]);
}

#[tokio::test]
async fn login_accepts_unnormalized_email() {
    let app = test_app().await;
    let request = json_request(
        "POST",
        "/v1/auth/login",
        serde_json::json!({ "email": " Admin@Example.EDU ", "password": ADMIN_PASSWORD }),
    );
    let response = app.clone().oneshot(request).await.expect("login");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn protected_endpoints_require_a_bearer_credential() {
    let app = test_app().await;
    let request = Request::builder()
        .uri("/v1/students")
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("list");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let garbage = authed_request("GET", "/v1/students", "not-a-jwt");
    let response = app.clone().oneshot(garbage).await.expect("list");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let payload = read_json(response).await;
    assert_eq!(payload["code"], "unauthenticated");
}

#[tokio::test]
async fn password_change_rotates_the_login_credential() {
    let app = test_app().await;
    let token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let wrong_current = authed_json_request(
        "POST",
        "/v1/auth/password",
        &token,
        serde_json::json!({ "current_password": "nope", "new_password": "fresh-password" }),
    );
    let response = app.clone().oneshot(wrong_current).await.expect("change");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let too_short = authed_json_request(
        "POST",
        "/v1/auth/password",
        &token,
        serde_json::json!({ "current_password": ADMIN_PASSWORD, "new_password": "short" }),
    );
    let response = app.clone().oneshot(too_short).await.expect("change");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let change = authed_json_request(
        "POST",
        "/v1/auth/password",
        &token,
        serde_json::json!({ "current_password": ADMIN_PASSWORD, "new_password": "fresh-password" }),
    );
    let response = app.clone().oneshot(change).await.expect("change");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let old_login = json_request(
        "POST",
        "/v1/auth/login",
        serde_json::json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
    );
    let response = app.clone().oneshot(old_login).await.expect("login");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    login(&app, ADMIN_EMAIL, "fresh-password").await;
}

#[tokio::test]
async fn identity_patch_updates_name_and_rekeys_email() {
    let app = test_app().await;
    let token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let patch = authed_json_request(
        "PATCH",
        "/v1/identity",
        &token,
        serde_json::json!({
            "display_name": "Head Registrar",
            "email": "registrar@example.edu",
            "preferences": { "theme": "dark" }
        }),
    );
    let response = app.clone().oneshot(patch).await.expect("patch");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload["display_name"], "Head Registrar");
    assert_eq!(payload["email"], "registrar@example.edu");

    // The credential still names the old email; login works on the new one.
    login(&app, "registrar@example.edu", ADMIN_PASSWORD).await;
    let old_login = json_request(
        "POST",
        "/v1/auth/login",
        serde_json::json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
    );
    let response = app.clone().oneshot(old_login).await.expect("login");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn identity_patch_rejects_email_collisions() {
    let app = test_app().await;
    let admin_token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    register_student(&app, &admin_token, "CS_STU_001", "ada@example.edu", &[]).await;

    let patch = authed_json_request(
        "PATCH",
        "/v1/identity",
        &admin_token,
        serde_json::json!({ "email": "Ada@Example.edu" }),
    );
    let response = app.clone().oneshot(patch).await.expect("patch");
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn identity_email_patch_rewrites_the_profile_back_reference() {
    let app = test_app().await;
    let admin_token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    register_student(&app, &admin_token, "CS_STU_001", "ada@example.edu", &[]).await;
    let student_token = login(&app, "ada@example.edu", "student-password").await;

    let patch = authed_json_request(
        "PATCH",
        "/v1/identity",
        &student_token,
        serde_json::json!({ "email": "ada.lovelace@example.edu" }),
    );
    let response = app.clone().oneshot(patch).await.expect("patch");
    assert_eq!(response.status(), StatusCode::OK);

    // The self-scoped profile read keeps working for a fresh credential,
    // which requires the profile email to have moved with the identity.
    let fresh_token = login(&app, "ada.lovelace@example.edu", "student-password").await;
    let own_profile = authed_request("GET", "/v1/students/CS_STU_001", &fresh_token);
    let response = app.clone().oneshot(own_profile).await.expect("profile");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload["email"], "ada.lovelace@example.edu");
}

#[tokio::test]
async fn get_identity_returns_own_record_without_hash() {
    let app = test_app().await;
    let token = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let response = app
        .clone()
        .oneshot(authed_request("GET", "/v1/identity", &token))
        .await
        .expect("identity");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload["email"], ADMIN_EMAIL);
    assert_eq!(payload["role"], "admin");
    assert!(payload.get("password_hash").is_none());
}

//! Registrar HTTP application wiring.
//!
//! # Purpose
//! Builds the Axum router, configures middleware, and defines the shared
//! application state injected into handlers.
//!
//! # Notes
//! This module centralizes route composition to keep `main` small and
//! testable.
use crate::api;
use crate::api::openapi::ApiDoc;
use crate::auth;
use crate::auth::token::TokenKeys;
use crate::store::RegistrarStore;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RegistrarStore + Send + Sync>,
    /// Process-wide signing key material, built once at startup.
    pub keys: Arc<TokenKeys>,
    pub token_ttl: Duration,
    pub api_version: String,
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            tracing::info_span!(
                "http.request",
                method = %request.method(),
                uri = %request.uri()
            )
        });

    Router::new()
        .route(
            "/v1/system/info",
            axum::routing::get(api::system::system_info),
        )
        .route(
            "/v1/system/health",
            axum::routing::get(api::system::system_health),
        )
        .route("/v1/auth/login", axum::routing::post(auth::login::login))
        .route(
            "/v1/auth/password",
            axum::routing::post(auth::login::change_password),
        )
        .route(
            "/v1/identity",
            axum::routing::get(api::identity::get_identity)
                .patch(api::identity::update_identity),
        )
        .route(
            "/v1/students",
            axum::routing::get(api::students::list_students)
                .post(api::students::register_student),
        )
        .route(
            "/v1/students/:student_id",
            axum::routing::get(api::students::get_student),
        )
        .route(
            "/v1/teachers",
            axum::routing::get(api::teachers::list_teachers)
                .post(api::teachers::register_teacher),
        )
        .route(
            "/v1/teachers/:teacher_id",
            axum::routing::get(api::teachers::get_teacher)
                .delete(api::teachers::delete_teacher),
        )
        .route(
            "/v1/courses",
            axum::routing::get(api::courses::list_courses).post(api::courses::create_course),
        )
        .route(
            "/v1/courses/:course_code/enrollments",
            axum::routing::post(api::courses::enroll_student),
        )
        .route("/v1/roster", axum::routing::get(api::attendance::get_roster))
        .route(
            "/v1/attendance",
            axum::routing::get(api::attendance::list_attendance)
                .post(api::attendance::save_attendance),
        )
        .merge(
            utoipa_swagger_ui::SwaggerUi::new("/docs").url("/v1/openapi.json", ApiDoc::openapi()),
        )
        .layer(trace_layer)
        .with_state(state)
}

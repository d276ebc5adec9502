//! Login and password-change endpoint handlers.
//!
//! # Purpose
//! Exchanges email/password for a signed credential, and lets an
//! authenticated caller rotate their own password.
use crate::api::error::{
    ApiError, api_internal, api_internal_message, api_not_found, api_unauthorized,
    api_unprocessable,
};
use crate::app::AppState;
use crate::auth::gate::authorize;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::issue;
use crate::model::{Role, normalize_email};
use crate::registration::MIN_PASSWORD_LEN;
use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub email: String,
    pub display_name: String,
    pub role: Role,
}

#[derive(Debug, Deserialize, ToSchema, Clone)]
pub struct PasswordChangeRequest {
    pub current_password: String,
    pub new_password: String,
}

#[utoipa::path(
    post,
    path = "/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credential issued", body = LoginResponse),
        (status = 401, description = "Unknown email or wrong password", body = crate::api::types::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = normalize_email(&body.email);
    let identity = state
        .store
        .find_identity(&email)
        .await
        .map_err(|err| api_internal("failed to load identity", &err))?;
    // One message for both failure shapes so the response does not reveal
    // whether the email is registered.
    let Some(identity) = identity else {
        return Err(api_unauthorized("invalid email or password"));
    };
    if !verify_password(&identity.password_hash, &body.password) {
        return Err(api_unauthorized("invalid email or password"));
    }
    let token = issue(&state.keys, &identity, state.token_ttl)
        .map_err(|_| api_internal_message("failed to mint credential"))?;
    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.token_ttl.as_secs(),
        email: identity.email,
        display_name: identity.display_name,
        role: identity.role,
    }))
}

#[utoipa::path(
    post,
    path = "/v1/auth/password",
    tag = "auth",
    request_body = PasswordChangeRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 401, description = "Missing credential or wrong current password"),
        (status = 422, description = "New password rejected")
    )
)]
pub async fn change_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<PasswordChangeRequest>,
) -> Result<StatusCode, ApiError> {
    let claims = authorize(&state, &headers, &[Role::Admin, Role::Teacher, Role::Student])?;
    let identity = state
        .store
        .find_identity(&claims.sub)
        .await
        .map_err(|err| api_internal("failed to load identity", &err))?
        .ok_or_else(|| api_not_found("identity not found"))?;
    if !verify_password(&identity.password_hash, &body.current_password) {
        return Err(api_unauthorized("current password does not match"));
    }
    if body.new_password.len() < MIN_PASSWORD_LEN {
        return Err(api_unprocessable(
            "validation_error",
            "new_password: must be at least 8 characters",
        ));
    }
    let hash = hash_password(&body.new_password)
        .map_err(|err| api_internal("failed to hash password", &err))?;
    state
        .store
        .set_password_hash(&claims.sub, hash)
        .await
        .map_err(|err| api_internal("failed to store password", &err))?;
    Ok(StatusCode::NO_CONTENT)
}

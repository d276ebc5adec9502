//! Identity API handlers.
//!
//! # Purpose
//! Self-service read and partial update of the caller's own account
//! identity.
use crate::api::error::{
    ApiError, api_conflict, api_internal, api_not_found, api_unprocessable,
};
use crate::api::types::ErrorResponse;
use crate::app::AppState;
use crate::auth::gate::authorize;
use crate::model::{Identity, IdentityPatch, Role, normalize_email};
use crate::store::StoreError;
use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;

#[utoipa::path(
    get,
    path = "/v1/identity",
    tag = "identity",
    responses(
        (status = 200, description = "Own identity", body = Identity),
        (status = 401, description = "Missing or invalid credential", body = ErrorResponse)
    )
)]
pub(crate) async fn get_identity(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Identity>, ApiError> {
    let claims = authorize(&state, &headers, &[Role::Admin, Role::Teacher, Role::Student])?;
    let identity = state
        .store
        .find_identity(&claims.sub)
        .await
        .map_err(|err| api_internal("failed to load identity", &err))?
        .ok_or_else(|| api_not_found("identity not found"))?;
    Ok(Json(identity))
}

#[utoipa::path(
    patch,
    path = "/v1/identity",
    tag = "identity",
    request_body = IdentityPatch,
    responses(
        (status = 200, description = "Updated identity", body = Identity),
        (status = 404, description = "Identity not found", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    )
)]
pub(crate) async fn update_identity(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(patch): Json<IdentityPatch>,
) -> Result<Json<Identity>, ApiError> {
    let claims = authorize(&state, &headers, &[Role::Admin, Role::Teacher, Role::Student])?;
    if let Some(display_name) = &patch.display_name {
        if display_name.trim().is_empty() {
            return Err(api_unprocessable(
                "validation_error",
                "display_name: must not be empty",
            ));
        }
    }
    if let Some(email) = &patch.email {
        if !email.contains('@') {
            return Err(api_unprocessable(
                "validation_error",
                "email: must be a valid email address",
            ));
        }
    }
    let new_email = patch.email.as_deref().map(normalize_email);

    let identity = match state.store.update_identity(&claims.sub, patch).await {
        Ok(identity) => identity,
        Err(StoreError::NotFound(detail)) => return Err(api_not_found(&detail)),
        Err(StoreError::Conflict(detail)) => return Err(api_conflict(&detail)),
        Err(err) => return Err(api_internal("failed to update identity", &err)),
    };

    // Keep the role profile's email back-reference in step with the
    // identity so the pair stays joined by email.
    if let Some(new_email) = new_email {
        if new_email != normalize_email(&claims.sub) {
            if let Err(err) = state
                .store
                .update_profile_email(claims.role, &claims.sub, &new_email)
                .await
            {
                tracing::warn!(role = claims.role.as_str(), error = %err,
                    "failed to rewrite profile email after identity patch");
            }
        }
    }
    Ok(Json(identity))
}

//! Role gate applied by handlers before touching role-scoped data.
//!
//! # Purpose
//! Extracts the bearer credential, verifies it against the process-wide
//! key, and restricts the operation to an allow-listed set of roles.
//! Self-scoped endpoints additionally pin the operation to the credential's
//! own identity via [`ensure_self`].
//!
//! # Notes
//! The verified claims are returned to the handler and flow downstream from
//! there; nothing is attached to shared state.
use crate::api::error::{ApiError, api_forbidden, api_unauthorized};
use crate::app::AppState;
use crate::auth::token::{Claims, verify};
use crate::model::{Role, normalize_email};
use axum::http::HeaderMap;

/// Verify the request credential and check it against the role allow-list.
///
/// Missing/invalid/expired credentials map to 401; a valid credential with
/// a role outside `allowed` maps to 403.
pub fn authorize(
    state: &AppState,
    headers: &HeaderMap,
    allowed: &[Role],
) -> Result<Claims, ApiError> {
    let bearer = extract_bearer(headers).ok_or_else(|| api_unauthorized("missing bearer token"))?;
    let claims = verify(&state.keys, bearer)
        .map_err(|_| api_unauthorized("invalid or expired credential"))?;
    if !allowed.contains(&claims.role) {
        return Err(api_forbidden("role not permitted for this operation"));
    }
    Ok(claims)
}

/// Reject cross-account access within the same role: the record owner's
/// email must match the credential subject.
pub fn ensure_self(claims: &Claims, owner_email: &str) -> Result<(), ApiError> {
    if normalize_email(owner_email) != normalize_email(&claims.sub) {
        return Err(api_forbidden("credential does not own this profile"));
    }
    Ok(())
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(axum::http::header::AUTHORIZATION)?;
    let value = value.to_str().ok()?;
    value.strip_prefix("Bearer ")
}

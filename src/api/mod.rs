//! Registrar HTTP API module.
//!
//! # Purpose
//! Exposes route handler modules and shared helpers for resolving the
//! calling teacher's profile.
pub mod attendance;
pub mod courses;
pub mod error;
pub mod identity;
pub mod openapi;
pub mod students;
pub mod system;
pub mod teachers;
pub mod types;

use crate::api::error::{ApiError, api_forbidden, api_internal};
use crate::app::AppState;
use crate::auth::token::Claims;
use crate::model::TeacherProfile;

/// Resolve the teacher profile behind a teacher-role credential. A valid
/// credential without a profile (the teacher was deregistered after login)
/// is treated as forbidden.
pub(crate) async fn require_teacher_profile(
    state: &AppState,
    claims: &Claims,
) -> Result<TeacherProfile, ApiError> {
    state
        .store
        .find_teacher_by_email(&claims.sub)
        .await
        .map_err(|err| api_internal("failed to load teacher profile", &err))?
        .ok_or_else(|| api_forbidden("no teacher profile for caller"))
}

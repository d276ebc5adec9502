//! Teacher role profile.
use super::ProfileStatus;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Teacher record keyed by the business-formatted teacher id (e.g. `T001`).
///
/// `assigned_courses` mirrors the `teacher_id` field on [`super::Course`];
/// course creation appends here as a second, non-transactional write. The
/// course collection is authoritative for attendance checks.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeacherProfile {
    pub teacher_id: String,
    pub display_name: String,
    pub email: String,
    pub department: String,
    pub contact_info: String,
    /// Creation-time copy of the identity hash; login verifies against the
    /// identity record, never against this field.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub status: ProfileStatus,
    pub position: String,
    /// Annual salary in whole currency units.
    pub salary: u64,
    pub assigned_courses: Vec<String>,
}

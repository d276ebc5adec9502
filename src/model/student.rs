//! Student role profile and enrollment records.
use super::ProfileStatus;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum EnrollmentStatus {
    Enrolled,
    Completed,
    Dropped,
}

/// One course membership. The collection on [`StudentProfile`] keeps
/// insertion order, which is the order the API reports.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EnrollmentRecord {
    pub course_code: String,
    /// Unix seconds at enrollment time.
    pub enrolled_at: i64,
    pub status: EnrollmentStatus,
}

/// Student record keyed by the business-formatted student id
/// (e.g. `CS_STU_001`). Carries a back-reference to the shared identity by
/// normalized email.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StudentProfile {
    pub student_id: String,
    pub display_name: String,
    pub email: String,
    pub department: String,
    pub contact_info: String,
    /// Creation-time copy of the identity hash; login verifies against the
    /// identity record, never against this field.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub status: ProfileStatus,
    pub enrollments: Vec<EnrollmentRecord>,
}

impl StudentProfile {
    /// Whether the student has any enrollment entry for the course,
    /// regardless of its status.
    pub fn is_enrolled_in(&self, course_code: &str) -> bool {
        self.enrollments
            .iter()
            .any(|entry| entry.course_code == course_code)
    }
}

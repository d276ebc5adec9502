//! Registrar data model module.
//!
//! # Purpose
//! Re-exports the identity/profile/course/attendance models and patch
//! payloads used by the API and store layers.
mod attendance;
mod course;
mod identity;
mod student;
mod teacher;

pub use attendance::{AttendanceKey, AttendanceMark, AttendanceRecord, AttendanceStatus};
pub use course::Course;
pub use identity::{Identity, IdentityPatch, Role, normalize_email};
pub use student::{EnrollmentRecord, EnrollmentStatus, StudentProfile};
pub use teacher::TeacherProfile;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle state shared by both role profiles. New profiles are Active;
/// nothing in the current API flips a profile to Inactive, but the store
/// round-trips the field so imported data keeps it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProfileStatus {
    Active,
    Inactive,
}

impl Default for ProfileStatus {
    fn default() -> Self {
        ProfileStatus::Active
    }
}

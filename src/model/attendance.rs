//! Attendance ledger records and their natural key.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum AttendanceStatus {
    Present,
    Absent,
    #[serde(rename = "Absent-with-Apology")]
    AbsentWithApology,
}

/// Natural key of a ledger entry. Re-submitting a sheet for the same key
/// replaces the status instead of inserting a duplicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct AttendanceKey {
    pub course_code: String,
    pub student_id: String,
    pub date: NaiveDate,
    pub teacher_id: String,
}

/// Stored ledger entry. Written only through the attendance engine and
/// never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecord {
    pub course_code: String,
    pub student_id: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub teacher_id: String,
    pub department: String,
}

impl AttendanceRecord {
    pub fn key(&self) -> AttendanceKey {
        AttendanceKey {
            course_code: self.course_code.clone(),
            student_id: self.student_id.clone(),
            date: self.date,
            teacher_id: self.teacher_id.clone(),
        }
    }
}

/// One row of a submitted attendance sheet.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendanceMark {
    pub student_id: String,
    pub status: AttendanceStatus,
}

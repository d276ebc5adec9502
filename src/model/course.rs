//! Course model.
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Course record keyed by unique course code. `teacher_id` establishes the
/// assignment relationship the attendance engine authorizes against;
/// `enrolled_students` mirrors the per-student enrollment collections.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Course {
    pub course_code: String,
    pub course_name: String,
    pub description: String,
    pub teacher_id: String,
    pub department: String,
    pub enrolled_students: Vec<String>,
}

//! Attendance reconciliation engine.
//!
//! # Purpose
//! Accepts a per-course attendance sheet, validates teacher-course
//! assignment and student-course enrollment, then commits idempotent keyed
//! upserts into the ledger. Also builds the teacher-facing roster.
//!
//! # Key invariants
//! - The whole sheet is validated before anything is written, so a single
//!   non-enrolled student rejects the batch with the ledger untouched.
//! - Upserts are keyed by (course, student, date, teacher); resubmitting a
//!   sheet replaces statuses instead of duplicating rows.
//! - The assignment check and the upserts are separate store calls, not one
//!   transaction: a course reassigned between them can admit one stale
//!   sheet. Accepted tradeoff; there are no cross-document transactions.
use crate::model::{AttendanceMark, AttendanceRecord, Course, StudentProfile, TeacherProfile};
use crate::store::{RegistrarStore, StoreError};
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AttendanceError {
    #[error("invalid attendance input: {0}")]
    InvalidInput(String),
    #[error("course not found: {0}")]
    CourseNotFound(String),
    #[error("course {course} is not assigned to teacher {teacher}")]
    NotAssigned { course: String, teacher: String },
    #[error("student {0} is not enrolled in the course")]
    NotEnrolled(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Courses a teacher runs plus the students enrolled in them, with each
/// student's enrollment list filtered down to those courses only.
#[derive(Debug, Clone)]
pub struct Roster {
    pub courses: Vec<Course>,
    pub students: Vec<StudentProfile>,
}

/// Validate and commit one attendance sheet. Returns the number of
/// processed marks.
pub async fn save_attendance(
    store: &dyn RegistrarStore,
    teacher: &TeacherProfile,
    course_code: &str,
    date: NaiveDate,
    marks: &[AttendanceMark],
) -> Result<usize, AttendanceError> {
    if course_code.trim().is_empty() {
        return Err(AttendanceError::InvalidInput(
            "course_code must not be empty".to_string(),
        ));
    }
    if marks.is_empty() {
        return Err(AttendanceError::InvalidInput(
            "records must not be empty".to_string(),
        ));
    }
    if marks.iter().any(|mark| mark.student_id.trim().is_empty()) {
        return Err(AttendanceError::InvalidInput(
            "every record needs a student_id".to_string(),
        ));
    }

    let course = store
        .find_course(course_code)
        .await?
        .ok_or_else(|| AttendanceError::CourseNotFound(course_code.to_string()))?;
    if course.teacher_id != teacher.teacher_id {
        return Err(AttendanceError::NotAssigned {
            course: course.course_code,
            teacher: teacher.teacher_id.clone(),
        });
    }

    // Validation pass over the whole sheet before the first write.
    for mark in marks {
        let enrolled = store
            .find_student(&mark.student_id)
            .await?
            .map(|student| student.is_enrolled_in(course_code))
            .unwrap_or(false);
        if !enrolled {
            return Err(AttendanceError::NotEnrolled(mark.student_id.clone()));
        }
    }

    for mark in marks {
        store
            .upsert_attendance(AttendanceRecord {
                course_code: course.course_code.clone(),
                student_id: mark.student_id.clone(),
                date,
                status: mark.status,
                teacher_id: teacher.teacher_id.clone(),
                department: course.department.clone(),
            })
            .await?;
    }

    metrics::counter!("registrar_attendance_marks_total").increment(marks.len() as u64);
    Ok(marks.len())
}

/// Build the roster for a teacher: their courses, and every student whose
/// enrollments intersect those courses. Enrollment entries for courses the
/// teacher does not run are stripped before the profile leaves the engine.
pub async fn assigned_roster(
    store: &dyn RegistrarStore,
    teacher_id: &str,
) -> Result<Roster, AttendanceError> {
    let courses = store.courses_by_teacher(teacher_id).await?;
    let codes: Vec<&str> = courses
        .iter()
        .map(|course| course.course_code.as_str())
        .collect();

    let mut students = Vec::new();
    for mut student in store.list_students(None).await? {
        student
            .enrollments
            .retain(|entry| codes.contains(&entry.course_code.as_str()));
        if !student.enrollments.is_empty() {
            students.push(student);
        }
    }
    Ok(Roster { courses, students })
}

//! Registration orchestration for the dual identity/profile write.
//!
//! # Purpose
//! The only legal writer of an identity + role-profile pair. Validates the
//! draft (reporting every violated field), pre-checks both stores for
//! duplicates, hashes the password once, and issues the two creates
//! concurrently.
//!
//! # Key invariants
//! - The pre-check and the creates are not atomic across the two stores;
//!   the store's uniqueness constraint is the authoritative duplicate
//!   guard, the pre-check only produces better error messages.
//! - When exactly one create lands, the result is surfaced as
//!   [`RegistrationError::Partial`] naming which side succeeded. Nothing is
//!   rolled back automatically; an admin reconciles by hand.
use crate::auth::password::hash_password;
use crate::model::{
    EnrollmentRecord, EnrollmentStatus, Identity, ProfileStatus, Role, StudentProfile,
    TeacherProfile, normalize_email,
};
use crate::store::{RegistrarStore, StoreError};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

pub(crate) const MIN_PASSWORD_LEN: usize = 8;

/// Student ids look like `CS_STU_001`: a 2-4 letter department prefix, the
/// fixed `_STU_` token, and a three-digit sequence.
fn student_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z]{2,4}_STU_\d{3}$").expect("student id pattern"))
}

/// Teacher ids look like `T001`.
fn teacher_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^T\d{3}$").expect("teacher id pattern"))
}

#[derive(Debug, Clone)]
pub struct StudentDraft {
    pub student_id: String,
    pub display_name: String,
    pub email: String,
    pub password: String,
    pub department: String,
    pub contact_info: String,
    /// Course codes to enroll in immediately after registration.
    pub enroll_in: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct TeacherDraft {
    pub teacher_id: String,
    pub display_name: String,
    pub email: String,
    pub password: String,
    pub department: String,
    pub contact_info: String,
    pub position: String,
    pub salary: u64,
}

#[derive(Debug, Clone)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

/// Which side of the dual write landed. Exactly one of the flags is true.
#[derive(Debug, Clone, Copy)]
pub struct PartialRegistration {
    pub identity_created: bool,
    pub profile_created: bool,
}

impl fmt::Display for PartialRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = if self.identity_created {
            "only the identity record was created"
        } else {
            "only the role profile was created"
        };
        write!(f, "registration landed partially: {side}; manual reconciliation required")
    }
}

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("validation failed: {}", format_violations(.0))]
    Validation(Vec<FieldViolation>),
    #[error("external id or email already registered")]
    AlreadyRegistered,
    #[error("{0}")]
    Partial(PartialRegistration),
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn format_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|violation| format!("{}: {}", violation.field, violation.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Register a student: one identity plus one student profile sharing the
/// same normalized email and a single password hash.
pub async fn register_student(
    store: &dyn RegistrarStore,
    draft: StudentDraft,
) -> Result<(Identity, StudentProfile), RegistrationError> {
    let mut violations = common_violations(
        &draft.display_name,
        &draft.email,
        &draft.password,
        &draft.department,
    );
    if !student_id_pattern().is_match(&draft.student_id) {
        violations.push(FieldViolation {
            field: "student_id",
            message: "must match the student id format, e.g. CS_STU_001".to_string(),
        });
    }
    for code in &draft.enroll_in {
        if store.find_course(code).await?.is_none() {
            violations.push(FieldViolation {
                field: "enroll_in",
                message: format!("unknown course: {code}"),
            });
        }
    }
    if !violations.is_empty() {
        return Err(RegistrationError::Validation(violations));
    }

    let email = normalize_email(&draft.email);
    let (existing_identity, existing_profile, existing_email) = tokio::join!(
        store.find_identity(&email),
        store.find_student(&draft.student_id),
        store.find_student_by_email(&email),
    );
    if existing_identity?.is_some() || existing_profile?.is_some() || existing_email?.is_some() {
        return Err(RegistrationError::AlreadyRegistered);
    }

    let hash = hash_password(&draft.password).map_err(StoreError::Unexpected)?;
    let identity = Identity {
        email: email.clone(),
        display_name: draft.display_name.clone(),
        password_hash: hash.clone(),
        role: Role::Student,
        profile_image: None,
        preferences: serde_json::json!({}),
    };
    let enrolled_at = chrono::Utc::now().timestamp();
    let profile = StudentProfile {
        student_id: draft.student_id.clone(),
        display_name: draft.display_name,
        email,
        department: draft.department,
        contact_info: draft.contact_info,
        password_hash: hash,
        status: ProfileStatus::Active,
        enrollments: draft
            .enroll_in
            .iter()
            .map(|code| EnrollmentRecord {
                course_code: code.clone(),
                enrolled_at,
                status: EnrollmentStatus::Enrolled,
            })
            .collect(),
    };

    let (identity_result, profile_result) = tokio::join!(
        store.create_identity(identity),
        store.create_student(profile),
    );
    let (identity, profile) = fold_dual_create(identity_result, profile_result)?;

    // Mirror the enrollments onto the course documents. Best effort: a
    // course deleted since the validation pass only loses its roster entry.
    for code in &draft.enroll_in {
        if let Err(err) = store.add_course_student(code, &profile.student_id).await {
            tracing::warn!(course = %code, student = %profile.student_id, error = %err,
                "failed to mirror enrollment onto course");
        }
    }

    metrics::counter!("registrar_registrations_total", "role" => "student").increment(1);
    Ok((identity, profile))
}

/// Register a teacher: one identity plus one teacher profile.
pub async fn register_teacher(
    store: &dyn RegistrarStore,
    draft: TeacherDraft,
) -> Result<(Identity, TeacherProfile), RegistrationError> {
    let mut violations = common_violations(
        &draft.display_name,
        &draft.email,
        &draft.password,
        &draft.department,
    );
    if !teacher_id_pattern().is_match(&draft.teacher_id) {
        violations.push(FieldViolation {
            field: "teacher_id",
            message: "must match the teacher id format, e.g. T001".to_string(),
        });
    }
    if draft.position.trim().is_empty() {
        violations.push(FieldViolation {
            field: "position",
            message: "must not be empty".to_string(),
        });
    }
    if draft.salary == 0 {
        violations.push(FieldViolation {
            field: "salary",
            message: "must be greater than zero".to_string(),
        });
    }
    if !violations.is_empty() {
        return Err(RegistrationError::Validation(violations));
    }

    let email = normalize_email(&draft.email);
    let (existing_identity, existing_profile, existing_email) = tokio::join!(
        store.find_identity(&email),
        store.find_teacher(&draft.teacher_id),
        store.find_teacher_by_email(&email),
    );
    if existing_identity?.is_some() || existing_profile?.is_some() || existing_email?.is_some() {
        return Err(RegistrationError::AlreadyRegistered);
    }

    let hash = hash_password(&draft.password).map_err(StoreError::Unexpected)?;
    let identity = Identity {
        email: email.clone(),
        display_name: draft.display_name.clone(),
        password_hash: hash.clone(),
        role: Role::Teacher,
        profile_image: None,
        preferences: serde_json::json!({}),
    };
    let profile = TeacherProfile {
        teacher_id: draft.teacher_id,
        display_name: draft.display_name,
        email,
        department: draft.department,
        contact_info: draft.contact_info,
        password_hash: hash,
        status: ProfileStatus::Active,
        position: draft.position,
        salary: draft.salary,
        assigned_courses: Vec::new(),
    };

    let (identity_result, profile_result) = tokio::join!(
        store.create_identity(identity),
        store.create_teacher(profile),
    );
    let pair = fold_dual_create(identity_result, profile_result)?;
    metrics::counter!("registrar_registrations_total", "role" => "teacher").increment(1);
    Ok(pair)
}

/// Remove a teacher profile and its paired identity.
///
/// The profile delete is authoritative; a missing identity afterwards means
/// the pair was already broken, so it is logged rather than failed.
pub async fn deregister_teacher(
    store: &dyn RegistrarStore,
    teacher_id: &str,
) -> Result<(), RegistrationError> {
    let profile = store
        .find_teacher(teacher_id)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("teacher: {teacher_id}")))?;
    store.delete_teacher(teacher_id).await?;
    match store.delete_identity(&profile.email).await {
        Ok(()) => {}
        Err(StoreError::NotFound(_)) => {
            tracing::warn!(teacher = %teacher_id, email = %profile.email,
                "paired identity already missing during deregistration");
        }
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

/// Fold the outcome of the concurrent dual create.
///
/// Both failing (typically both conflicting with a racing registration)
/// reads as AlreadyRegistered when a conflict is involved; one side landing
/// is the partial-failure window that gets surfaced distinctly.
fn fold_dual_create<T>(
    identity_result: Result<Identity, StoreError>,
    profile_result: Result<T, StoreError>,
) -> Result<(Identity, T), RegistrationError> {
    match (identity_result, profile_result) {
        (Ok(identity), Ok(profile)) => Ok((identity, profile)),
        (Err(identity_err), Err(profile_err)) => {
            if matches!(identity_err, StoreError::Conflict(_))
                || matches!(profile_err, StoreError::Conflict(_))
            {
                Err(RegistrationError::AlreadyRegistered)
            } else {
                Err(RegistrationError::Store(identity_err))
            }
        }
        (Ok(_), Err(_)) => Err(RegistrationError::Partial(PartialRegistration {
            identity_created: true,
            profile_created: false,
        })),
        (Err(_), Ok(_)) => Err(RegistrationError::Partial(PartialRegistration {
            identity_created: false,
            profile_created: true,
        })),
    }
}

fn common_violations(
    display_name: &str,
    email: &str,
    password: &str,
    department: &str,
) -> Vec<FieldViolation> {
    let mut violations = Vec::new();
    if display_name.trim().is_empty() {
        violations.push(FieldViolation {
            field: "display_name",
            message: "must not be empty".to_string(),
        });
    }
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        violations.push(FieldViolation {
            field: "email",
            message: "must be a valid email address".to_string(),
        });
    }
    if password.len() < MIN_PASSWORD_LEN {
        violations.push(FieldViolation {
            field: "password",
            message: "must be at least 8 characters".to_string(),
        });
    }
    if department.trim().is_empty() {
        violations.push(FieldViolation {
            field: "department",
            message: "must not be empty".to_string(),
        });
    }
    violations
}

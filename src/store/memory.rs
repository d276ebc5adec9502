//! In-memory implementation of the registrar store.
//!
//! # Purpose
//! This store implements the `RegistrarStore` trait entirely in memory using
//! `HashMap`s guarded by `tokio::sync::RwLock`. It exists for:
//! - local development and tests (no external dependencies)
//! - deployments where durability is not required
//!
//! # Durability and consistency
//! - **Not durable**: all state is lost on process restart.
//! - **Single-process consistency**: write locks for mutations, read locks
//!   for reads. Each trait method touches one collection under one lock, so
//!   every call is atomic per document.
//! - Uniqueness is checked under the write lock at insert time; a racing
//!   duplicate observes `Conflict`, never a hang and never two records.
//!
//! # Ordering
//! List reads report insertion order. Each collection keeps its key order
//! beside the map instead of a change log: this service needs stable
//! listings, not changefeeds.
use super::{RegistrarStore, StoreError, StoreResult};
use crate::model::{
    AttendanceKey, AttendanceRecord, Course, EnrollmentRecord, Identity, IdentityPatch, Role,
    StudentProfile, TeacherProfile, normalize_email,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Insertion-ordered keyed collection backing one entity type.
#[derive(Debug, Default)]
struct Table<T> {
    order: Vec<String>,
    items: HashMap<String, T>,
}

impl<T: Clone> Table<T> {
    fn new() -> Self {
        Self {
            order: Vec::new(),
            items: HashMap::new(),
        }
    }

    fn insert(&mut self, key: String, value: T) -> bool {
        if self.items.contains_key(&key) {
            return false;
        }
        self.order.push(key.clone());
        self.items.insert(key, value);
        true
    }

    fn get(&self, key: &str) -> Option<&T> {
        self.items.get(key)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut T> {
        self.items.get_mut(key)
    }

    fn remove(&mut self, key: &str) -> Option<T> {
        let removed = self.items.remove(key);
        if removed.is_some() {
            self.order.retain(|entry| entry != key);
        }
        removed
    }

    /// Move a record to a new key, keeping its position in the listing.
    fn rekey(&mut self, old: &str, new: String) {
        if let Some(value) = self.items.remove(old) {
            self.items.insert(new.clone(), value);
            for entry in &mut self.order {
                if entry == old {
                    *entry = new;
                    break;
                }
            }
        }
    }

    fn values(&self) -> Vec<T> {
        self.order
            .iter()
            .filter_map(|key| self.items.get(key))
            .cloned()
            .collect()
    }
}

/// In-memory registrar store.
///
/// Each collection is wrapped in its own `Arc<RwLock<...>>` so the store can
/// be cloned into async handlers, reads proceed concurrently, and writes to
/// different collections do not serialize against each other.
pub struct InMemoryStore {
    /// Identities keyed by normalized email.
    identities: Arc<RwLock<Table<Identity>>>,
    /// Student profiles keyed by student id.
    students: Arc<RwLock<Table<StudentProfile>>>,
    /// Teacher profiles keyed by teacher id.
    teachers: Arc<RwLock<Table<TeacherProfile>>>,
    /// Courses keyed by course code.
    courses: Arc<RwLock<Table<Course>>>,
    /// Attendance ledger keyed by the natural record key.
    attendance: Arc<RwLock<Ledger>>,
}

/// Append-ordered attendance ledger with keyed upsert.
#[derive(Default)]
struct Ledger {
    order: Vec<AttendanceKey>,
    items: HashMap<AttendanceKey, AttendanceRecord>,
}

impl Ledger {
    /// Replace the record when the key exists, insert otherwise.
    fn upsert(&mut self, record: AttendanceRecord) {
        let key = record.key();
        if self.items.insert(key.clone(), record).is_none() {
            self.order.push(key);
        }
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            identities: Arc::new(RwLock::new(Table::new())),
            students: Arc::new(RwLock::new(Table::new())),
            teachers: Arc::new(RwLock::new(Table::new())),
            courses: Arc::new(RwLock::new(Table::new())),
            attendance: Arc::new(RwLock::new(Ledger::default())),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RegistrarStore for InMemoryStore {
    async fn create_identity(&self, mut identity: Identity) -> StoreResult<Identity> {
        identity.email = normalize_email(&identity.email);
        let mut identities = self.identities.write().await;
        if !identities.insert(identity.email.clone(), identity.clone()) {
            return Err(StoreError::Conflict(format!(
                "identity already exists: {}",
                identity.email
            )));
        }
        Ok(identity)
    }

    async fn find_identity(&self, email: &str) -> StoreResult<Option<Identity>> {
        let identities = self.identities.read().await;
        Ok(identities.get(&normalize_email(email)).cloned())
    }

    async fn update_identity(&self, email: &str, patch: IdentityPatch) -> StoreResult<Identity> {
        let key = normalize_email(email);
        let mut identities = self.identities.write().await;
        if identities.get(&key).is_none() {
            return Err(StoreError::NotFound(format!("identity: {key}")));
        }
        // Check the email collision before mutating anything so a rejected
        // patch leaves the record untouched.
        let new_key = patch.email.as_deref().map(normalize_email);
        if let Some(new_key) = &new_key {
            if *new_key != key && identities.get(new_key).is_some() {
                return Err(StoreError::Conflict(format!(
                    "identity already exists: {new_key}"
                )));
            }
        }
        let Some(identity) = identities.get_mut(&key) else {
            return Err(StoreError::NotFound(format!("identity: {key}")));
        };
        if let Some(display_name) = patch.display_name {
            identity.display_name = display_name;
        }
        if let Some(profile_image) = patch.profile_image {
            identity.profile_image = Some(profile_image);
        }
        if let Some(preferences) = patch.preferences {
            identity.preferences = preferences;
        }
        if let Some(new_key) = &new_key {
            identity.email = new_key.clone();
        }
        let updated = identity.clone();
        if let Some(new_key) = new_key {
            if new_key != key {
                identities.rekey(&key, new_key);
            }
        }
        Ok(updated)
    }

    async fn set_password_hash(&self, email: &str, hash: String) -> StoreResult<()> {
        let key = normalize_email(email);
        let mut identities = self.identities.write().await;
        let identity = identities
            .get_mut(&key)
            .ok_or_else(|| StoreError::NotFound(format!("identity: {key}")))?;
        identity.password_hash = hash;
        Ok(())
    }

    async fn delete_identity(&self, email: &str) -> StoreResult<()> {
        let key = normalize_email(email);
        let mut identities = self.identities.write().await;
        identities
            .remove(&key)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("identity: {key}")))
    }

    async fn create_student(&self, mut profile: StudentProfile) -> StoreResult<StudentProfile> {
        profile.email = normalize_email(&profile.email);
        let mut students = self.students.write().await;
        if students
            .values()
            .iter()
            .any(|entry| entry.email == profile.email)
        {
            return Err(StoreError::Conflict(format!(
                "student email already registered: {}",
                profile.email
            )));
        }
        if !students.insert(profile.student_id.clone(), profile.clone()) {
            return Err(StoreError::Conflict(format!(
                "student already exists: {}",
                profile.student_id
            )));
        }
        Ok(profile)
    }

    async fn find_student(&self, student_id: &str) -> StoreResult<Option<StudentProfile>> {
        let students = self.students.read().await;
        Ok(students.get(student_id).cloned())
    }

    async fn find_student_by_email(&self, email: &str) -> StoreResult<Option<StudentProfile>> {
        let key = normalize_email(email);
        let students = self.students.read().await;
        Ok(students
            .values()
            .into_iter()
            .find(|entry| entry.email == key))
    }

    async fn list_students(&self, department: Option<&str>) -> StoreResult<Vec<StudentProfile>> {
        let students = self.students.read().await;
        let mut items = students.values();
        if let Some(department) = department {
            items.retain(|entry| entry.department == department);
        }
        Ok(items)
    }

    async fn add_enrollment(
        &self,
        student_id: &str,
        record: EnrollmentRecord,
    ) -> StoreResult<StudentProfile> {
        let mut students = self.students.write().await;
        let profile = students
            .get_mut(student_id)
            .ok_or_else(|| StoreError::NotFound(format!("student: {student_id}")))?;
        if profile.is_enrolled_in(&record.course_code) {
            return Err(StoreError::Conflict(format!(
                "student {student_id} already enrolled in {}",
                record.course_code
            )));
        }
        profile.enrollments.push(record);
        Ok(profile.clone())
    }

    async fn create_teacher(&self, mut profile: TeacherProfile) -> StoreResult<TeacherProfile> {
        profile.email = normalize_email(&profile.email);
        let mut teachers = self.teachers.write().await;
        if teachers
            .values()
            .iter()
            .any(|entry| entry.email == profile.email)
        {
            return Err(StoreError::Conflict(format!(
                "teacher email already registered: {}",
                profile.email
            )));
        }
        if !teachers.insert(profile.teacher_id.clone(), profile.clone()) {
            return Err(StoreError::Conflict(format!(
                "teacher already exists: {}",
                profile.teacher_id
            )));
        }
        Ok(profile)
    }

    async fn find_teacher(&self, teacher_id: &str) -> StoreResult<Option<TeacherProfile>> {
        let teachers = self.teachers.read().await;
        Ok(teachers.get(teacher_id).cloned())
    }

    async fn find_teacher_by_email(&self, email: &str) -> StoreResult<Option<TeacherProfile>> {
        let key = normalize_email(email);
        let teachers = self.teachers.read().await;
        Ok(teachers
            .values()
            .into_iter()
            .find(|entry| entry.email == key))
    }

    async fn list_teachers(&self, department: Option<&str>) -> StoreResult<Vec<TeacherProfile>> {
        let teachers = self.teachers.read().await;
        let mut items = teachers.values();
        if let Some(department) = department {
            items.retain(|entry| entry.department == department);
        }
        Ok(items)
    }

    async fn delete_teacher(&self, teacher_id: &str) -> StoreResult<()> {
        let mut teachers = self.teachers.write().await;
        teachers
            .remove(teacher_id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("teacher: {teacher_id}")))
    }

    async fn add_teacher_course(&self, teacher_id: &str, course_code: &str) -> StoreResult<()> {
        let mut teachers = self.teachers.write().await;
        let profile = teachers
            .get_mut(teacher_id)
            .ok_or_else(|| StoreError::NotFound(format!("teacher: {teacher_id}")))?;
        if !profile
            .assigned_courses
            .iter()
            .any(|entry| entry == course_code)
        {
            profile.assigned_courses.push(course_code.to_string());
        }
        Ok(())
    }

    async fn create_course(&self, course: Course) -> StoreResult<Course> {
        let mut courses = self.courses.write().await;
        if !courses.insert(course.course_code.clone(), course.clone()) {
            return Err(StoreError::Conflict(format!(
                "course already exists: {}",
                course.course_code
            )));
        }
        Ok(course)
    }

    async fn find_course(&self, course_code: &str) -> StoreResult<Option<Course>> {
        let courses = self.courses.read().await;
        Ok(courses.get(course_code).cloned())
    }

    async fn list_courses(&self) -> StoreResult<Vec<Course>> {
        let courses = self.courses.read().await;
        Ok(courses.values())
    }

    async fn courses_by_teacher(&self, teacher_id: &str) -> StoreResult<Vec<Course>> {
        let courses = self.courses.read().await;
        let mut items = courses.values();
        items.retain(|entry| entry.teacher_id == teacher_id);
        Ok(items)
    }

    async fn add_course_student(&self, course_code: &str, student_id: &str) -> StoreResult<()> {
        let mut courses = self.courses.write().await;
        let course = courses
            .get_mut(course_code)
            .ok_or_else(|| StoreError::NotFound(format!("course: {course_code}")))?;
        if !course
            .enrolled_students
            .iter()
            .any(|entry| entry == student_id)
        {
            course.enrolled_students.push(student_id.to_string());
        }
        Ok(())
    }

    async fn upsert_attendance(&self, record: AttendanceRecord) -> StoreResult<()> {
        let mut ledger = self.attendance.write().await;
        ledger.upsert(record);
        Ok(())
    }

    async fn list_attendance(
        &self,
        course_code: &str,
        date: NaiveDate,
    ) -> StoreResult<Vec<AttendanceRecord>> {
        let ledger = self.attendance.read().await;
        Ok(ledger
            .order
            .iter()
            .filter(|key| key.course_code == course_code && key.date == date)
            .filter_map(|key| ledger.items.get(key))
            .cloned()
            .collect())
    }

    async fn update_profile_email(
        &self,
        role: Role,
        old_email: &str,
        new_email: &str,
    ) -> StoreResult<()> {
        let old_key = normalize_email(old_email);
        let new_key = normalize_email(new_email);
        match role {
            Role::Student => {
                let mut students = self.students.write().await;
                let target = students
                    .values()
                    .into_iter()
                    .find(|entry| entry.email == old_key)
                    .map(|entry| entry.student_id);
                if let Some(student_id) = target {
                    if let Some(profile) = students.get_mut(&student_id) {
                        profile.email = new_key;
                    }
                }
            }
            Role::Teacher => {
                let mut teachers = self.teachers.write().await;
                let target = teachers
                    .values()
                    .into_iter()
                    .find(|entry| entry.email == old_key)
                    .map(|entry| entry.teacher_id);
                if let Some(teacher_id) = target {
                    if let Some(profile) = teachers.get_mut(&teacher_id) {
                        profile.email = new_key;
                    }
                }
            }
            Role::Admin => {}
        }
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn is_durable(&self) -> bool {
        false
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use gradewarrior::error::AppError;
use gradewarrior::gateway::{GradeGateway, InMemoryGateway};
use gradewarrior::models::{
    Assignment, Course, NewAssignmentRequest, UpdateAssignmentInput, UpdateCourseInput,
};
use gradewarrior::services::CourseSynchronizer;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    GetCourses,
    CreateCourse(String),
    UpdateCourse(UpdateCourseInput),
    DeleteCourse(String),
    CreateAssignment { course_id: String, name: String },
    UpdateAssignment(UpdateAssignmentInput),
    DeleteAssignment(String),
    SyncTheoretical(String),
}

/// In-memory gateway that records every call, and delays or fails the
/// operations it is told to.
#[derive(Default)]
pub struct RecordingGateway {
    inner: InMemoryGateway,
    calls: Mutex<Vec<Call>>,
    failing: Mutex<HashSet<&'static str>>,
    delays: Mutex<HashMap<&'static str, Duration>>,
}

impl RecordingGateway {
    pub fn with_courses(courses: Vec<Course>) -> Self {
        Self {
            inner: InMemoryGateway::with_courses(courses),
            ..Default::default()
        }
    }

    pub fn fail(&self, operation: &'static str) {
        self.failing.lock().unwrap().insert(operation);
    }

    pub fn recover(&self, operation: &'static str) {
        self.failing.lock().unwrap().remove(operation);
    }

    /// Makes `operation` take `delay` before it answers. Failure is decided
    /// after the delay.
    pub fn slow(&self, operation: &'static str, delay: Duration) {
        self.delays.lock().unwrap().insert(operation, delay);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count<F: Fn(&Call) -> bool>(&self, matches: F) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| matches(c)).count()
    }

    pub fn server_courses(&self) -> Vec<Course> {
        self.inner.snapshot()
    }

    async fn record(&self, operation: &'static str, call: Call) -> Result<(), AppError> {
        self.calls.lock().unwrap().push(call);
        let delay = self.delays.lock().unwrap().get(operation).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.lock().unwrap().contains(operation) {
            return Err(AppError::Upstream(format!("simulated {} failure", operation)));
        }
        Ok(())
    }
}

#[async_trait]
impl GradeGateway for RecordingGateway {
    async fn get_courses(&self) -> Result<Vec<Course>, AppError> {
        self.record("get_courses", Call::GetCourses).await?;
        self.inner.get_courses().await
    }

    async fn create_course(&self, name: &str) -> Result<Course, AppError> {
        self.record("create_course", Call::CreateCourse(name.to_string())).await?;
        self.inner.create_course(name).await
    }

    async fn update_course(&self, input: &UpdateCourseInput) -> Result<Course, AppError> {
        self.record("update_course", Call::UpdateCourse(input.clone())).await?;
        self.inner.update_course(input).await
    }

    async fn delete_course(&self, id: &str) -> Result<bool, AppError> {
        self.record("delete_course", Call::DeleteCourse(id.to_string())).await?;
        self.inner.delete_course(id).await
    }

    async fn create_assignment(
        &self,
        course_id: &str,
        req: &NewAssignmentRequest,
    ) -> Result<Assignment, AppError> {
        self.record(
            "create_assignment",
            Call::CreateAssignment {
                course_id: course_id.to_string(),
                name: req.name.clone(),
            },
        ).await?;
        self.inner.create_assignment(course_id, req).await
    }

    async fn update_assignment(&self, input: &UpdateAssignmentInput) -> Result<Assignment, AppError> {
        self.record("update_assignment", Call::UpdateAssignment(input.clone())).await?;
        self.inner.update_assignment(input).await
    }

    async fn delete_assignment(&self, id: &str) -> Result<bool, AppError> {
        self.record("delete_assignment", Call::DeleteAssignment(id.to_string())).await?;
        self.inner.delete_assignment(id).await
    }

    async fn sync_theoretical_assignments(&self, course_id: &str) -> Result<Vec<Assignment>, AppError> {
        self.record("sync_theoretical", Call::SyncTheoretical(course_id.to_string())).await?;
        self.inner.sync_theoretical_assignments(course_id).await
    }
}

pub fn assignment(id: &str, name: &str, grade: f64, weight: f64, is_theoretical: bool) -> Assignment {
    Assignment {
        id: id.to_string(),
        name: name.to_string(),
        grade,
        weight,
        is_theoretical,
    }
}

/// Two courses: "1" Math with real "2", "3" and theoretical "4"; "5" History
/// with real "6".
pub fn seed_courses() -> Vec<Course> {
    let mut math = Course::new("1", "Math");
    math.assignments = vec![
        assignment("2", "Homework", 80.0, 50.0, false),
        assignment("3", "Midterm", 90.0, 50.0, false),
    ];
    math.theoretical_assignments = vec![assignment("4", "Final", 100.0, 30.0, true)];

    let mut history = Course::new("5", "History");
    history.assignments = vec![assignment("6", "Essay", 70.0, 100.0, false)];

    vec![math, history]
}

/// A loaded synchronizer whose debounce never fires on its own during a test.
pub async fn loaded_sync() -> (Arc<RecordingGateway>, CourseSynchronizer) {
    loaded_sync_with_debounce(Duration::from_secs(600)).await
}

pub async fn loaded_sync_with_debounce(debounce: Duration) -> (Arc<RecordingGateway>, CourseSynchronizer) {
    let gateway = Arc::new(RecordingGateway::with_courses(seed_courses()));
    let sync = CourseSynchronizer::new(gateway.clone(), debounce);
    sync.refresh().await.expect("initial load");
    (gateway, sync)
}

pub fn local_assignment(sync: &CourseSynchronizer, id: &str) -> Option<Assignment> {
    sync.courses()
        .into_iter()
        .find_map(|c| c.assignment(id).cloned())
}

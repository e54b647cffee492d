use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::error::AppError;
use crate::gateway::GradeGateway;
use crate::models::{Assignment, Course, NewAssignmentRequest, UpdateAssignmentInput, UpdateCourseInput};

/// Process-local stand-in for the GraphQL service. Ids are sequential
/// integers rendered as strings, as the reference server assigns them.
#[derive(Default)]
pub struct InMemoryGateway {
    store: Mutex<MemoryStore>,
}

#[derive(Default)]
struct MemoryStore {
    next_id: u64,
    courses: Vec<Course>,
}

impl MemoryStore {
    fn next_id(&mut self) -> String {
        self.next_id += 1;
        self.next_id.to_string()
    }

    fn course_mut(&mut self, id: &str) -> Result<&mut Course, AppError> {
        self.courses
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(AppError::NotFound)
    }
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with existing courses, e.g. to simulate data created
    /// by another client.
    pub fn with_courses(courses: Vec<Course>) -> Self {
        let next_id = courses
            .iter()
            .flat_map(|c| std::iter::once(c.id.as_str()).chain(c.assignment_ids()))
            .filter_map(|id| id.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        Self {
            store: Mutex::new(MemoryStore { next_id, courses }),
        }
    }

    pub fn snapshot(&self) -> Vec<Course> {
        self.lock().courses.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl GradeGateway for InMemoryGateway {
    async fn get_courses(&self) -> Result<Vec<Course>, AppError> {
        Ok(self.snapshot())
    }

    async fn create_course(&self, name: &str) -> Result<Course, AppError> {
        let mut store = self.lock();
        let course = Course::new(store.next_id(), name);
        store.courses.push(course.clone());
        Ok(course)
    }

    async fn update_course(&self, input: &UpdateCourseInput) -> Result<Course, AppError> {
        let mut store = self.lock();
        let course = store.course_mut(&input.id)?;
        if let Some(name) = &input.name {
            course.name = name.clone();
        }
        Ok(course.clone())
    }

    async fn delete_course(&self, id: &str) -> Result<bool, AppError> {
        let mut store = self.lock();
        let before = store.courses.len();
        store.courses.retain(|c| c.id != id);
        if store.courses.len() == before {
            return Err(AppError::NotFound);
        }
        Ok(true)
    }

    async fn create_assignment(
        &self,
        course_id: &str,
        req: &NewAssignmentRequest,
    ) -> Result<Assignment, AppError> {
        let mut store = self.lock();
        let id = store.next_id();
        let course = store.course_mut(course_id)?;
        let assignment = Assignment {
            id,
            name: req.name.clone(),
            grade: req.grade,
            weight: req.weight,
            is_theoretical: req.is_theoretical,
        };
        course.push_assignment(assignment.clone());
        Ok(assignment)
    }

    async fn update_assignment(&self, input: &UpdateAssignmentInput) -> Result<Assignment, AppError> {
        let mut store = self.lock();
        let course = store
            .courses
            .iter_mut()
            .find(|c| c.contains_assignment(&input.id))
            .ok_or(AppError::NotFound)?;

        let assignment = course.assignment_mut(&input.id).ok_or(AppError::NotFound)?;
        input.apply_to(assignment);
        let moved_flag = input
            .is_theoretical
            .filter(|flag| *flag != assignment.is_theoretical);

        let Some(flag) = moved_flag else {
            return Ok(assignment.clone());
        };
        let mut moved = course.remove_assignment(&input.id).ok_or(AppError::NotFound)?;
        moved.is_theoretical = flag;
        course.push_assignment(moved.clone());
        Ok(moved)
    }

    async fn delete_assignment(&self, id: &str) -> Result<bool, AppError> {
        let mut store = self.lock();
        let removed = store
            .courses
            .iter_mut()
            .find_map(|c| c.remove_assignment(id));
        match removed {
            Some(_) => Ok(true),
            None => Err(AppError::NotFound),
        }
    }

    /// Resets the what-if ledger to fresh copies of the real one.
    async fn sync_theoretical_assignments(&self, course_id: &str) -> Result<Vec<Assignment>, AppError> {
        let mut store = self.lock();
        let real = store.course_mut(course_id)?.assignments.clone();

        let mut copies = Vec::with_capacity(real.len());
        for a in real {
            copies.push(Assignment {
                id: store.next_id(),
                is_theoretical: true,
                ..a
            });
        }

        let course = store.course_mut(course_id)?;
        course.theoretical_assignments = copies.clone();
        Ok(copies)
    }
}

use serde::{Deserialize, Serialize};

use crate::calc::weighted_average;
use crate::models::Assignment;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub theoretical_assignments: Vec<Assignment>,
}

impl Course {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            assignments: Vec::new(),
            theoretical_assignments: Vec::new(),
        }
    }

    pub fn contains_assignment(&self, id: &str) -> bool {
        self.assignment(id).is_some()
    }

    pub fn assignment(&self, id: &str) -> Option<&Assignment> {
        self.assignments
            .iter()
            .chain(self.theoretical_assignments.iter())
            .find(|a| a.id == id)
    }

    pub fn assignment_mut(&mut self, id: &str) -> Option<&mut Assignment> {
        self.assignments
            .iter_mut()
            .chain(self.theoretical_assignments.iter_mut())
            .find(|a| a.id == id)
    }

    /// Appends to the ledger named by the assignment's flag.
    pub fn push_assignment(&mut self, assignment: Assignment) {
        if assignment.is_theoretical {
            self.theoretical_assignments.push(assignment);
        } else {
            self.assignments.push(assignment);
        }
    }

    pub fn remove_assignment(&mut self, id: &str) -> Option<Assignment> {
        if let Some(pos) = self.assignments.iter().position(|a| a.id == id) {
            return Some(self.assignments.remove(pos));
        }
        if let Some(pos) = self.theoretical_assignments.iter().position(|a| a.id == id) {
            return Some(self.theoretical_assignments.remove(pos));
        }
        None
    }

    pub fn assignment_ids(&self) -> impl Iterator<Item = &str> {
        self.assignments
            .iter()
            .chain(self.theoretical_assignments.iter())
            .map(|a| a.id.as_str())
    }

    /// Moves every assignment into the ledger its flag names, keeping the
    /// relative order within each ledger.
    pub fn normalize_ledgers(&mut self) {
        let misplaced_real = self.assignments.iter().any(|a| a.is_theoretical);
        let misplaced_theoretical = self.theoretical_assignments.iter().any(|a| !a.is_theoretical);
        if !misplaced_real && !misplaced_theoretical {
            return;
        }

        let all: Vec<Assignment> = self
            .assignments
            .drain(..)
            .chain(self.theoretical_assignments.drain(..))
            .collect();
        for assignment in all {
            self.push_assignment(assignment);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCourseRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameCourseRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateCourseInput {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A course as the course list displays it, with both averages computed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    #[serde(flatten)]
    pub course: Course,
    pub average: f64,
    pub theoretical_average: f64,
}

impl From<Course> for CourseSummary {
    fn from(course: Course) -> Self {
        let average = weighted_average(&course.assignments);
        let theoretical_average = weighted_average(&course.theoretical_assignments);
        Self {
            course,
            average,
            theoretical_average,
        }
    }
}

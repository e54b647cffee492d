use serde::{Deserialize, Serialize};

use crate::models::{Assignment, Course};

#[derive(Debug, Serialize)]
pub struct GraphqlRequest<'a> {
    pub query: &'a str,
    pub variables: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlError {
    pub message: String,
}

/// GraphQL `ID` values come back as strings from most servers and as numbers
/// from some.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Text(String),
    Number(i64),
}

impl From<Id> for String {
    fn from(id: Id) -> Self {
        match id {
            Id::Text(s) => s,
            Id::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentDto {
    pub id: Id,
    pub name: String,
    pub grade: f64,
    pub weight: f64,
    #[serde(default)]
    pub is_theoretical: Option<bool>,
}

impl AssignmentDto {
    pub fn into_assignment(self, default_theoretical: bool) -> Assignment {
        Assignment {
            id: self.id.into(),
            name: self.name,
            grade: self.grade,
            weight: self.weight,
            is_theoretical: self.is_theoretical.unwrap_or(default_theoretical),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDto {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub assignments: Option<Vec<AssignmentDto>>,
    #[serde(default)]
    pub theoretical_assignments: Option<Vec<AssignmentDto>>,
}

impl CourseDto {
    pub fn into_course(self) -> Course {
        let mut course = Course::new(String::from(self.id), self.name);
        course.assignments = self
            .assignments
            .unwrap_or_default()
            .into_iter()
            .map(|a| a.into_assignment(false))
            .collect();
        course.theoretical_assignments = self
            .theoretical_assignments
            .unwrap_or_default()
            .into_iter()
            .map(|a| a.into_assignment(true))
            .collect();
        course.normalize_ledgers();
        course
    }
}

#[derive(Debug, Deserialize)]
pub struct CoursesData {
    pub courses: Vec<CourseDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseData {
    pub create_course: CourseDto,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseData {
    pub update_course: CourseDto,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCourseData {
    pub delete_course: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssignmentData {
    pub create_assignment: AssignmentDto,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssignmentData {
    pub update_assignment: AssignmentDto,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAssignmentData {
    pub delete_assignment: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncTheoreticalData {
    pub sync_theoretical_assignments: Vec<AssignmentDto>,
}

/// Delete mutations answer with a boolean or with the deleted id; anything
/// but `null`/`false` counts as success.
pub fn is_confirmed(value: &serde_json::Value) -> bool {
    !matches!(value, serde_json::Value::Null | serde_json::Value::Bool(false))
}

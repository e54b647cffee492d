pub const GET_COURSES: &str = r#"
query GetCourses {
  courses {
    id
    name
    assignments { id name grade weight isTheoretical }
    theoreticalAssignments { id name grade weight isTheoretical }
  }
}
"#;

pub const CREATE_COURSE: &str = r#"
mutation CreateCourse($name: String!) {
  createCourse(input: {name: $name}) { id name }
}
"#;

pub const UPDATE_COURSE: &str = r#"
mutation UpdateCourse($id: ID!, $name: String) {
  updateCourse(input: {id: $id, name: $name}) { id name }
}
"#;

pub const DELETE_COURSE: &str = r#"
mutation DeleteCourse($id: ID!) {
  deleteCourse(id: $id)
}
"#;

pub const CREATE_ASSIGNMENT: &str = r#"
mutation CreateAssignment($name: String!, $grade: Float!, $weight: Float!, $courseId: ID!, $isTheoretical: Boolean) {
  createAssignment(input: {name: $name, grade: $grade, weight: $weight, courseId: $courseId, isTheoretical: $isTheoretical}) {
    id name grade weight isTheoretical
  }
}
"#;

pub const UPDATE_ASSIGNMENT: &str = r#"
mutation UpdateAssignment($id: ID!, $name: String, $grade: Float, $weight: Float, $isTheoretical: Boolean) {
  updateAssignment(input: {id: $id, name: $name, grade: $grade, weight: $weight, isTheoretical: $isTheoretical}) {
    id name grade weight isTheoretical
  }
}
"#;

pub const DELETE_ASSIGNMENT: &str = r#"
mutation DeleteAssignment($id: ID!) {
  deleteAssignment(id: $id)
}
"#;

pub const SYNC_THEORETICAL_ASSIGNMENTS: &str = r#"
mutation SyncTheoreticalAssignments($courseId: ID!) {
  syncTheoreticalAssignments(courseId: $courseId) {
    id name grade weight isTheoretical
  }
}
"#;

pub mod assignment;
pub mod course;
pub mod edit;

pub use assignment::{Assignment, NewAssignmentRequest, UpdateAssignmentInput};
pub use course::{Course, CourseSummary, NewCourseRequest, RenameCourseRequest, UpdateCourseInput};
pub use edit::{AssignmentEdit, AssignmentEditRequest};

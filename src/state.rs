use crate::services::CourseSynchronizer;

#[derive(Clone)]
pub struct AppState {
    pub sync: CourseSynchronizer,
}

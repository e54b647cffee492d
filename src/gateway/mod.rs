pub mod dto;
pub mod memory;
pub mod queries;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::AppError;
use crate::models::{Assignment, Course, NewAssignmentRequest, UpdateAssignmentInput, UpdateCourseInput};

pub use memory::InMemoryGateway;

#[derive(Clone, Debug)]
pub struct GraphqlConfig {
    pub endpoint: String,
    pub timeout: Duration,
}

impl GraphqlConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout,
        }
    }

    pub fn new_from_env() -> Result<Self, AppError> {
        let endpoint = std::env::var("GRAPHQL_ENDPOINT")
            .map_err(|_| AppError::Config("GRAPHQL_ENDPOINT is not set".to_string()))?;
        Ok(Self::new(endpoint, Self::DEFAULT_TIMEOUT))
    }
}

/// Remote operations the synchronizer depends on. Every call may fail; the
/// synchronizer decides what a failure means for local state.
#[async_trait]
pub trait GradeGateway: Send + Sync {
    async fn get_courses(&self) -> Result<Vec<Course>, AppError>;
    async fn create_course(&self, name: &str) -> Result<Course, AppError>;
    async fn update_course(&self, input: &UpdateCourseInput) -> Result<Course, AppError>;
    async fn delete_course(&self, id: &str) -> Result<bool, AppError>;
    async fn create_assignment(
        &self,
        course_id: &str,
        req: &NewAssignmentRequest,
    ) -> Result<Assignment, AppError>;
    async fn update_assignment(&self, input: &UpdateAssignmentInput) -> Result<Assignment, AppError>;
    async fn delete_assignment(&self, id: &str) -> Result<bool, AppError>;
    async fn sync_theoretical_assignments(&self, course_id: &str) -> Result<Vec<Assignment>, AppError>;
}

pub struct GraphqlGateway {
    client: Client,
    config: GraphqlConfig,
}

impl GraphqlGateway {
    pub fn new(config: GraphqlConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, AppError> {
        let request_body = dto::GraphqlRequest { query, variables };

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "GraphQL endpoint returned {} for {}: {}",
                status, operation, body
            )));
        }

        let body_text = response.text().await?;
        tracing::debug!("{} response: {}", operation, body_text);

        let parsed: dto::GraphqlResponse<T> = serde_json::from_str(&body_text)?;
        if !parsed.errors.is_empty() {
            let messages: Vec<String> = parsed.errors.into_iter().map(|e| e.message).collect();
            return Err(AppError::Graphql(format!("{}: {}", operation, messages.join("; "))));
        }

        parsed
            .data
            .ok_or_else(|| AppError::Graphql(format!("{} returned no data", operation)))
    }
}

#[async_trait]
impl GradeGateway for GraphqlGateway {
    async fn get_courses(&self) -> Result<Vec<Course>, AppError> {
        let data: dto::CoursesData = self
            .execute("GetCourses", queries::GET_COURSES, json!({}))
            .await?;
        Ok(data.courses.into_iter().map(dto::CourseDto::into_course).collect())
    }

    async fn create_course(&self, name: &str) -> Result<Course, AppError> {
        let data: dto::CreateCourseData = self
            .execute("CreateCourse", queries::CREATE_COURSE, json!({ "name": name }))
            .await?;
        Ok(data.create_course.into_course())
    }

    async fn update_course(&self, input: &UpdateCourseInput) -> Result<Course, AppError> {
        let data: dto::UpdateCourseData = self
            .execute("UpdateCourse", queries::UPDATE_COURSE, serde_json::to_value(input)?)
            .await?;
        Ok(data.update_course.into_course())
    }

    async fn delete_course(&self, id: &str) -> Result<bool, AppError> {
        let data: dto::DeleteCourseData = self
            .execute("DeleteCourse", queries::DELETE_COURSE, json!({ "id": id }))
            .await?;
        Ok(dto::is_confirmed(&data.delete_course))
    }

    async fn create_assignment(
        &self,
        course_id: &str,
        req: &NewAssignmentRequest,
    ) -> Result<Assignment, AppError> {
        let variables = json!({
            "name": req.name,
            "grade": req.grade,
            "weight": req.weight,
            "courseId": course_id,
            "isTheoretical": req.is_theoretical,
        });
        let data: dto::CreateAssignmentData = self
            .execute("CreateAssignment", queries::CREATE_ASSIGNMENT, variables)
            .await?;
        Ok(data.create_assignment.into_assignment(req.is_theoretical))
    }

    async fn update_assignment(&self, input: &UpdateAssignmentInput) -> Result<Assignment, AppError> {
        let data: dto::UpdateAssignmentData = self
            .execute("UpdateAssignment", queries::UPDATE_ASSIGNMENT, serde_json::to_value(input)?)
            .await?;
        Ok(data
            .update_assignment
            .into_assignment(input.is_theoretical.unwrap_or(false)))
    }

    async fn delete_assignment(&self, id: &str) -> Result<bool, AppError> {
        let data: dto::DeleteAssignmentData = self
            .execute("DeleteAssignment", queries::DELETE_ASSIGNMENT, json!({ "id": id }))
            .await?;
        Ok(dto::is_confirmed(&data.delete_assignment))
    }

    async fn sync_theoretical_assignments(&self, course_id: &str) -> Result<Vec<Assignment>, AppError> {
        let data: dto::SyncTheoreticalData = self
            .execute(
                "SyncTheoreticalAssignments",
                queries::SYNC_THEORETICAL_ASSIGNMENTS,
                json!({ "courseId": course_id }),
            )
            .await?;
        Ok(data
            .sync_theoretical_assignments
            .into_iter()
            .map(|a| a.into_assignment(true))
            .collect())
    }
}

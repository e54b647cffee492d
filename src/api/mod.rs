use axum::Json;
use axum::extract::Path;
use axum::response::{IntoResponse, Response};
use axum::routing::{patch, post};
use axum::{Router, extract::State, http::StatusCode, routing::get};

use crate::error::AppError;
use crate::models::*;
use crate::services::{SyncReport, SyncStatus};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/courses", get(list_courses).post(create_course))
        .route("/courses/{id}", patch(rename_course).delete(delete_course))
        .route("/courses/{id}/assignments", post(add_assignment))
        .route("/courses/{id}/theoretical/sync", post(sync_theoretical))
        .route("/assignments/{id}", patch(update_assignment).delete(delete_assignment))
        .route("/sync", get(sync_status).post(sync_now))
        .route("/sync/blur", post(blur))
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn list_courses(State(state): State<AppState>) -> Json<Vec<CourseSummary>> {
    Json(state.sync.course_summaries())
}

async fn create_course(
    State(state): State<AppState>,
    Json(req): Json<NewCourseRequest>
) -> Result<(StatusCode, Json<Course>), AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::BadRequest("Course name is required".to_string()));
    }
    let course = state
        .sync
        .handle_create_course(&req.name)
        .await
        .ok_or_else(|| AppError::Upstream("Course could not be created".to_string()))?;
    Ok((StatusCode::CREATED, Json(course)))
}

async fn rename_course(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RenameCourseRequest>
) -> Result<StatusCode, AppError> {
    if state.sync.handle_course_name_change(&id, &req.name) {
        Ok(StatusCode::ACCEPTED)
    } else {
        Err(AppError::NotFound)
    }
}

async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<String>
) -> Result<StatusCode, AppError> {
    if state.sync.handle_delete_course(&id) {
        Ok(StatusCode::ACCEPTED)
    } else {
        Err(AppError::NotFound)
    }
}

async fn add_assignment(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    Json(req): Json<NewAssignmentRequest>
) -> Result<(StatusCode, Json<Assignment>), AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::BadRequest("Assignment name is required".to_string()));
    }
    let assignment = state
        .sync
        .handle_add_assignment(&course_id, req)
        .await
        .ok_or_else(|| AppError::Upstream("Assignment could not be created".to_string()))?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

async fn sync_theoretical(
    State(state): State<AppState>,
    Path(course_id): Path<String>
) -> Result<Json<Vec<Assignment>>, AppError> {
    let ledger = state
        .sync
        .handle_sync_theoretical_assignments(&course_id)
        .await
        .ok_or_else(|| AppError::Upstream("Theoretical assignments could not be synced".to_string()))?;
    Ok(Json(ledger))
}

async fn update_assignment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AssignmentEditRequest>
) -> Result<StatusCode, AppError> {
    let edit = req.into_edit()?;
    if state.sync.handle_assignment_change(&id, edit) {
        Ok(StatusCode::ACCEPTED)
    } else {
        Err(AppError::NotFound)
    }
}

async fn delete_assignment(
    State(state): State<AppState>,
    Path(id): Path<String>
) -> Result<StatusCode, AppError> {
    if state.sync.handle_delete_assignment(&id) {
        Ok(StatusCode::ACCEPTED)
    } else {
        Err(AppError::NotFound)
    }
}

async fn sync_status(State(state): State<AppState>) -> Json<SyncStatus> {
    Json(state.sync.status())
}

async fn sync_now(State(state): State<AppState>) -> Json<SyncReport> {
    Json(state.sync.handle_sync_now().await)
}

async fn blur(State(state): State<AppState>) -> Response {
    match state.sync.handle_blur().await {
        Some(report) => Json(report).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

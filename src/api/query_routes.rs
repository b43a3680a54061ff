//! Catalog, student and schedule lookups

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::Deserialize;

use super::response::{ApiError, ApiResponse, ApiResult};
use super::AppState;
use crate::models::{
    CatalogDepartment, EnrolledCourseRow, SectionWithMeetings, StudentId, StudentRow,
};

pub(super) async fn health(State(state): State<Arc<AppState>>) -> ApiResult<&'static str> {
    state.queries.ping().await?;
    Ok(Json(
        ApiResponse::ok("OK").with_message("Database connection is healthy"),
    ))
}

pub(super) async fn catalog(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<CatalogDepartment>> {
    Ok(Json(ApiResponse::ok(state.queries.list_catalog().await?)))
}

pub(super) async fn students(State(state): State<Arc<AppState>>) -> ApiResult<Vec<StudentRow>> {
    Ok(Json(ApiResponse::ok(state.queries.list_students().await?)))
}

#[derive(Debug, Deserialize)]
pub struct ScheduleParams {
    pub student_id: Option<StudentId>,
}

pub(super) async fn student_schedule(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ScheduleParams>, QueryRejection>,
) -> ApiResult<Vec<SectionWithMeetings>> {
    let Query(params) = params.map_err(|r| ApiError::validation(r.body_text()))?;
    let student_id = params
        .student_id
        .ok_or_else(|| ApiError::validation("student_id query parameter is required"))?;

    Ok(Json(ApiResponse::ok(
        state.queries.student_schedule(student_id).await?,
    )))
}

pub(super) async fn enrolled_courses(
    State(state): State<Arc<AppState>>,
    student_id: Result<Path<StudentId>, PathRejection>,
) -> ApiResult<Vec<EnrolledCourseRow>> {
    let Path(student_id) = student_id.map_err(|r| ApiError::validation(r.body_text()))?;
    Ok(Json(ApiResponse::ok(
        state.queries.enrolled_courses(student_id).await?,
    )))
}

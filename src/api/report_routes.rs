//! Reporting endpoints

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use super::response::{ApiError, ApiResponse, ApiResult};
use super::AppState;
use crate::models::{
    InstructorWorkloadRow, SectionUtilizationRow, StudentLoadMetrics, StudentLoadRow,
};

/// Rows go in `data`; metrics sit beside them at the top level.
#[derive(Debug, Serialize)]
pub struct StudentLoadResponse {
    #[serde(flatten)]
    pub envelope: ApiResponse<Vec<StudentLoadRow>>,
    pub metrics: StudentLoadMetrics,
}

pub(super) async fn section_utilization(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<SectionUtilizationRow>> {
    Ok(Json(ApiResponse::ok(
        state.queries.section_utilization().await?,
    )))
}

pub(super) async fn student_load_distribution(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StudentLoadResponse>, ApiError> {
    let report = state.queries.student_load_distribution().await?;
    Ok(Json(StudentLoadResponse {
        envelope: ApiResponse::ok(report.rows),
        metrics: report.metrics,
    }))
}

pub(super) async fn instructor_workload(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<InstructorWorkloadRow>> {
    Ok(Json(ApiResponse::ok(
        state.queries.instructor_workload().await?,
    )))
}

//! Enroll / cancel endpoints

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;

use super::response::{ApiError, ApiResponse, ApiResult};
use super::AppState;
use crate::enrollment::EnrollmentConfirmation;
use crate::models::{SectionId, StudentId};

/// Both fields are optional at the wire level so a missing field is a
/// validation error rather than a body rejection.
#[derive(Debug, Deserialize)]
pub struct EnrollmentRequest {
    pub student_id: Option<StudentId>,
    pub section_id: Option<SectionId>,
}

impl EnrollmentRequest {
    fn ids(&self) -> Result<(StudentId, SectionId), ApiError> {
        match (self.student_id, self.section_id) {
            (Some(student_id), Some(section_id)) => Ok((student_id, section_id)),
            _ => Err(ApiError::validation(
                "student_id and section_id are required",
            )),
        }
    }
}

fn parse_body(
    body: Result<Json<EnrollmentRequest>, JsonRejection>,
) -> Result<(StudentId, SectionId), ApiError> {
    let Json(req) = body.map_err(|rejection| ApiError::validation(rejection.body_text()))?;
    req.ids()
}

pub(super) async fn enroll(
    State(state): State<Arc<AppState>>,
    body: Result<Json<EnrollmentRequest>, JsonRejection>,
) -> ApiResult<EnrollmentConfirmation> {
    let (student_id, section_id) = parse_body(body)?;
    let confirmation = state.engine.enroll(student_id, section_id).await?;
    Ok(Json(
        ApiResponse::ok(confirmation).with_message("Enrollment successful"),
    ))
}

pub(super) async fn cancel_enrollment(
    State(state): State<Arc<AppState>>,
    body: Result<Json<EnrollmentRequest>, JsonRejection>,
) -> ApiResult<EnrollmentConfirmation> {
    let (student_id, section_id) = parse_body(body)?;
    let confirmation = state.engine.cancel(student_id, section_id).await?;
    Ok(Json(
        ApiResponse::ok(confirmation).with_message("Enrollment cancelled successfully"),
    ))
}

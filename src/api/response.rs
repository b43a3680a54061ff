//! Response envelope and error → HTTP mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::error::EnrollmentError;

/// `{success, data?, error?, code?, message?}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            code: None,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    pub fn failure(error: impl Into<String>, code: &'static str) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            code: Some(code),
            message: None,
        }
    }
}

/// Handler error. Internal detail is logged, never returned.
#[derive(Debug)]
pub struct ApiError(pub EnrollmentError);

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self(EnrollmentError::Validation(message.into()))
    }
}

impl From<EnrollmentError> for ApiError {
    fn from(e: EnrollmentError) -> Self {
        Self(e)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self(EnrollmentError::Internal(e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = match &self.0 {
            EnrollmentError::Internal(e) => {
                error!("Request failed: {:#}", e);
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ApiResponse::failure(message, self.0.code()))).into_response()
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

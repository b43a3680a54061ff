//! HTTP API
//!
//! Translates requests into [`EnrollmentEngine`] and [`QueryService`] calls
//! and engine outcomes into status codes. All responses use the
//! [`ApiResponse`] envelope.
//!
//! | Method | Path | |
//! |---|---|---|
//! | GET | `/api/health` | database connectivity check |
//! | GET | `/api/catalog` | departments → courses → sections |
//! | GET | `/api/students` | flat student list |
//! | GET | `/api/student_schedule?student_id=` | sections with meetings |
//! | GET | `/api/enrolled_courses/:student_id` | enrollment rows |
//! | POST | `/api/enroll` | `{student_id, section_id}` |
//! | POST | `/api/cancel_enrollment` | `{student_id, section_id}` |
//! | GET | `/api/reports/section_utilization` | |
//! | GET | `/api/reports/student_load_distribution` | rows + metrics |
//! | GET | `/api/reports/instructor_workload` | |

use std::sync::Arc;
use std::time::Duration;

use axum::{
    error_handling::HandleErrorLayer,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower::{timeout::error::Elapsed, BoxError, ServiceBuilder};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, warn};

use crate::enrollment::EnrollmentEngine;
use crate::queries::QueryService;

mod enrollment_routes;
mod query_routes;
mod report_routes;
pub mod response;

pub use enrollment_routes::EnrollmentRequest;
pub use report_routes::StudentLoadResponse;
pub use response::{ApiError, ApiResponse, ApiResult};

// =============================================================================
// STATE
// =============================================================================

pub struct AppState {
    pub engine: EnrollmentEngine,
    pub queries: Arc<dyn QueryService>,
}

impl AppState {
    pub fn new(engine: EnrollmentEngine, queries: Arc<dyn QueryService>) -> Self {
        Self { engine, queries }
    }
}

// =============================================================================
// ROUTER
// =============================================================================

/// Routes only, no middleware.
pub fn api_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(query_routes::health))
        // Catalog & students
        .route("/api/catalog", get(query_routes::catalog))
        .route("/api/students", get(query_routes::students))
        .route("/api/student_schedule", get(query_routes::student_schedule))
        .route(
            "/api/enrolled_courses/:student_id",
            get(query_routes::enrolled_courses),
        )
        // Enrollment
        .route("/api/enroll", post(enrollment_routes::enroll))
        .route(
            "/api/cancel_enrollment",
            post(enrollment_routes::cancel_enrollment),
        )
        // Reports
        .route(
            "/api/reports/section_utilization",
            get(report_routes::section_utilization),
        )
        .route(
            "/api/reports/student_load_distribution",
            get(report_routes::student_load_distribution),
        )
        .route(
            "/api/reports/instructor_workload",
            get(report_routes::instructor_workload),
        )
        .with_state(state)
}

/// Full application: routes plus tracing, CORS and the request timeout.
/// A request cut off by the timeout drops its in-flight transaction, which
/// rolls it back, and answers 408 inside the usual envelope.
pub fn create_router(state: Arc<AppState>, request_timeout: Duration) -> Router {
    api_router(state)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(request_timeout),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn handle_middleware_error(err: BoxError) -> (StatusCode, Json<ApiResponse<()>>) {
    if err.is::<Elapsed>() {
        warn!("Request exceeded the configured timeout");
        return (
            StatusCode::REQUEST_TIMEOUT,
            Json(ApiResponse::failure("Request timed out", "REQUEST_TIMEOUT")),
        );
    }
    error!("Unhandled middleware error: {}", err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::failure("An internal error occurred", "INTERNAL_ERROR")),
    )
}

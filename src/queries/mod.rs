//! Query Layer - read-only projections over the university schema
//!
//! Reads take no locks and run under read-committed visibility, so a report
//! may or may not include an enrollment that is committing concurrently.
//! The row shaping (nesting, grouping, metrics) is kept in pure functions so
//! it does not depend on how rows were fetched.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{
    CatalogDepartment, EnrolledCourseRow, InstructorWorkloadRow, SectionUtilizationRow,
    SectionWithMeetings, StudentId, StudentLoadReport, StudentRow,
};

pub mod catalog;
pub mod reports;
pub mod schedule;

pub use catalog::nest_catalog;
pub use reports::{student_load_metrics, FULL_TIME_CREDITS};
pub use schedule::group_schedule;

#[async_trait]
pub trait QueryService: Send + Sync {
    /// Connectivity check.
    async fn ping(&self) -> Result<()>;

    async fn list_catalog(&self) -> Result<Vec<CatalogDepartment>>;
    async fn list_students(&self) -> Result<Vec<StudentRow>>;
    async fn student_schedule(&self, student_id: StudentId) -> Result<Vec<SectionWithMeetings>>;
    async fn enrolled_courses(&self, student_id: StudentId) -> Result<Vec<EnrolledCourseRow>>;

    // ── Reports ──

    async fn section_utilization(&self) -> Result<Vec<SectionUtilizationRow>>;
    async fn student_load_distribution(&self) -> Result<StudentLoadReport>;
    async fn instructor_workload(&self) -> Result<Vec<InstructorWorkloadRow>>;
}

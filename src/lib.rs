//! University course-enrollment service
//!
//! Catalog browsing, student schedules and reports over a relational
//! schema, plus the transactional enroll/cancel workflow in
//! [`enrollment::EnrollmentEngine`].

pub mod api;
pub mod config;
pub mod database;
pub mod enrollment;
pub mod error;
pub mod models;
pub mod queries;

pub use error::{EnrollmentError, EnrollmentResult};

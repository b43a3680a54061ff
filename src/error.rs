//! Error taxonomy for enrollment operations
//!
//! Every engine failure is one of these variants. The API layer turns them
//! into HTTP status codes via [`EnrollmentError::http_status`]; storage and
//! query failures arrive as `Internal` through `anyhow`.

use thiserror::Error;

use crate::models::{SectionId, StudentId, Weekday};

#[derive(Debug, Error)]
pub enum EnrollmentError {
    #[error("section {section_id} not found")]
    SectionNotFound { section_id: SectionId },

    #[error("student {student_id} not found")]
    StudentNotFound { student_id: StudentId },

    #[error("section {section_id} is full")]
    SectionFull { section_id: SectionId },

    #[error("student {student_id} is already enrolled in section {section_id}")]
    AlreadyEnrolled {
        student_id: StudentId,
        section_id: SectionId,
    },

    #[error(
        "section {section_id} conflicts with enrolled section {conflicting_section_id} on {day}"
    )]
    ScheduleConflict {
        section_id: SectionId,
        conflicting_section_id: SectionId,
        day: Weekday,
    },

    #[error("student {student_id} is not enrolled in section {section_id}")]
    NotEnrolled {
        student_id: StudentId,
        section_id: SectionId,
    },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("internal: {0}")]
    Internal(#[from] anyhow::Error),
}

impl EnrollmentError {
    pub fn http_status(&self) -> u16 {
        match self {
            Self::SectionNotFound { .. } | Self::StudentNotFound { .. } => 404,
            Self::NotEnrolled { .. } => 404,
            Self::SectionFull { .. } | Self::AlreadyEnrolled { .. } => 409,
            Self::ScheduleConflict { .. } => 409,
            Self::Validation(_) => 400,
            Self::Internal(_) => 500,
        }
    }

    /// Stable machine-readable code, independent of the display message.
    pub fn code(&self) -> &'static str {
        match self {
            Self::SectionNotFound { .. } => "SECTION_NOT_FOUND",
            Self::StudentNotFound { .. } => "STUDENT_NOT_FOUND",
            Self::SectionFull { .. } => "SECTION_FULL",
            Self::AlreadyEnrolled { .. } => "ALREADY_ENROLLED",
            Self::ScheduleConflict { .. } => "SCHEDULE_CONFLICT",
            Self::NotEnrolled { .. } => "NOT_ENROLLED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

impl From<sqlx::Error> for EnrollmentError {
    fn from(e: sqlx::Error) -> Self {
        Self::Internal(anyhow::Error::new(e))
    }
}

pub type EnrollmentResult<T> = std::result::Result<T, EnrollmentError>;

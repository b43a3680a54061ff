//! Typed rows and views for the university schema
//!
//! Each query has its own `FromRow` struct; nested views are assembled
//! from those rows by the query layer.

use std::fmt;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

pub mod catalog;
pub mod reports;
pub mod schedule;

pub use catalog::{CatalogCourse, CatalogDepartment, CatalogRow, CatalogSection};
pub use reports::{
    InstructorWorkloadRow, SectionUtilizationRow, StudentLoadMetrics, StudentLoadReport,
    StudentLoadRow,
};
pub use schedule::{EnrolledCourseRow, ScheduleRow, SectionWithMeetings, StudentRow};

pub type StudentId = i32;
pub type SectionId = i32;

/// Day a section meets. Stored and serialized as the full English name,
/// matching the `section_schedule.day_of_week` check constraint.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "VARCHAR")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One weekly meeting interval of a section, half-open `[start_time, end_time)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Meeting {
    pub day_of_week: Weekday,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl Meeting {
    pub fn new(day_of_week: Weekday, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            day_of_week,
            start_time,
            end_time,
        }
    }
}

/// A meeting tagged with its section, as read inside the enrollment
/// transaction.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct MeetingRow {
    pub section_id: SectionId,
    #[sqlx(flatten)]
    pub meeting: Meeting,
}

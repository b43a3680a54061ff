//! Student, schedule and enrolled-course rows

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Meeting, SectionId, StudentId, Weekday};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StudentRow {
    pub student_id: StudentId,
    pub student_number: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
}

/// One meeting of one enrolled section. Meeting columns are null for a
/// section that has no schedule rows yet.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScheduleRow {
    pub section_id: SectionId,
    pub section_code: String,
    pub course_code: String,
    pub course_title: String,
    pub credits: i32,
    pub instructor_name: Option<String>,
    pub day_of_week: Option<Weekday>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionWithMeetings {
    pub section_id: SectionId,
    pub section_code: String,
    pub course_code: String,
    pub course_title: String,
    pub credits: i32,
    pub instructor_name: Option<String>,
    pub meetings: Vec<Meeting>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct EnrolledCourseRow {
    pub enrollment_id: i32,
    pub section_id: SectionId,
    pub section_code: String,
    pub course_id: i32,
    pub course_code: String,
    pub course_title: String,
    pub credits: i32,
    pub capacity: i32,
    pub instructor_name: Option<String>,
    pub enrolled_at: DateTime<Utc>,
}

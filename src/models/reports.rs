//! Reporting rows (read-only aggregations)

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{SectionId, StudentId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SectionUtilizationRow {
    pub section_id: SectionId,
    pub course_code: String,
    pub course_title: String,
    pub section_code: String,
    pub department_name: Option<String>,
    pub capacity: i32,
    pub remaining_slots: i32,
    pub enrolled_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StudentLoadRow {
    pub student_id: StudentId,
    pub student_number: String,
    pub first_name: String,
    pub last_name: String,
    pub total_credits: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentLoadMetrics {
    pub average_credits: f64,
    pub under_loaded_count: usize,
    /// Total-credits value → share of students, in percent (2 dp).
    pub distribution_percent: BTreeMap<i64, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentLoadReport {
    pub rows: Vec<StudentLoadRow>,
    pub metrics: StudentLoadMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct InstructorWorkloadRow {
    pub instructor_id: i32,
    pub instructor_name: String,
    pub department_name: Option<String>,
    pub total_sections: i64,
    pub total_students: i64,
}

//! Catalog rows and the nested department/course/section view

use serde::{Deserialize, Serialize};

use super::SectionId;

/// Flat row of the catalog join. Course and section columns are null for
/// departments without courses and courses without sections.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CatalogRow {
    pub dept_id: i32,
    pub dept_code: String,
    pub dept_name: String,
    pub course_id: Option<i32>,
    pub course_code: Option<String>,
    pub course_title: Option<String>,
    pub credits: Option<i32>,
    pub section_id: Option<SectionId>,
    pub section_code: Option<String>,
    pub capacity: Option<i32>,
    pub remaining_slots: Option<i32>,
    pub instructor_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogDepartment {
    pub dept_id: i32,
    pub dept_code: String,
    pub dept_name: String,
    pub courses: Vec<CatalogCourse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogCourse {
    pub course_id: i32,
    pub course_code: String,
    pub course_title: String,
    pub credits: i32,
    pub sections: Vec<CatalogSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSection {
    pub section_id: SectionId,
    pub section_code: String,
    pub capacity: i32,
    pub remaining_slots: i32,
    pub instructor_name: Option<String>,
}

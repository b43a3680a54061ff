//! Query Service - read-only catalog, schedule and report queries

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::models::{
    CatalogDepartment, CatalogRow, EnrolledCourseRow, InstructorWorkloadRow, ScheduleRow,
    SectionUtilizationRow, SectionWithMeetings, StudentId, StudentLoadReport, StudentLoadRow,
    StudentRow,
};
use crate::queries::{group_schedule, nest_catalog, student_load_metrics, QueryService};

#[derive(Clone, Debug)]
pub struct PgQueryService {
    pool: PgPool,
}

impl PgQueryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn catalog_rows(&self) -> Result<Vec<CatalogRow>> {
        sqlx::query_as::<_, CatalogRow>(
            r#"
            SELECT d.dept_id, d.dept_code, d.dept_name,
                   c.course_id, c.course_code, c.course_title, c.credits,
                   s.section_id, s.section_code, s.capacity, s.remaining_slots,
                   i.first_name || ' ' || i.last_name AS instructor_name
            FROM department d
            LEFT JOIN course c ON c.dept_id = d.dept_id
            LEFT JOIN section s ON s.course_id = c.course_id
            LEFT JOIN instructor i ON i.instructor_id = s.instructor_id
            ORDER BY d.dept_name, c.course_code, s.section_code
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to load catalog")
    }

    pub async fn schedule_rows(&self, student_id: StudentId) -> Result<Vec<ScheduleRow>> {
        sqlx::query_as::<_, ScheduleRow>(
            r#"
            SELECT s.section_id, s.section_code, c.course_code, c.course_title, c.credits,
                   i.first_name || ' ' || i.last_name AS instructor_name,
                   ss.day_of_week, ss.start_time, ss.end_time
            FROM enrollment e
            JOIN section s ON s.section_id = e.section_id
            JOIN course c ON c.course_id = s.course_id
            LEFT JOIN instructor i ON i.instructor_id = s.instructor_id
            LEFT JOIN section_schedule ss ON ss.section_id = s.section_id
            WHERE e.student_id = $1
            ORDER BY c.course_code, s.section_code, ss.schedule_id
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load student schedule")
    }

    pub async fn student_load_rows(&self) -> Result<Vec<StudentLoadRow>> {
        sqlx::query_as::<_, StudentLoadRow>(
            r#"
            SELECT st.student_id, st.student_number, st.first_name, st.last_name,
                   COALESCE(SUM(c.credits), 0)::bigint AS total_credits
            FROM student st
            LEFT JOIN enrollment e ON e.student_id = st.student_id
            LEFT JOIN section s ON s.section_id = e.section_id
            LEFT JOIN course c ON c.course_id = s.course_id
            GROUP BY st.student_id, st.student_number, st.first_name, st.last_name
            ORDER BY total_credits DESC, st.student_number
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to load student credit totals")
    }
}

#[async_trait]
impl QueryService for PgQueryService {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database health check failed")?;
        Ok(())
    }

    async fn list_catalog(&self) -> Result<Vec<CatalogDepartment>> {
        let rows = self.catalog_rows().await?;
        debug!("Catalog query returned {} rows", rows.len());
        Ok(nest_catalog(rows))
    }

    async fn list_students(&self) -> Result<Vec<StudentRow>> {
        sqlx::query_as::<_, StudentRow>(
            r#"
            SELECT student_id, student_number, first_name, last_name, email
            FROM student
            ORDER BY last_name, first_name, student_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list students")
    }

    async fn student_schedule(&self, student_id: StudentId) -> Result<Vec<SectionWithMeetings>> {
        let rows = self.schedule_rows(student_id).await?;
        Ok(group_schedule(rows))
    }

    async fn enrolled_courses(&self, student_id: StudentId) -> Result<Vec<EnrolledCourseRow>> {
        sqlx::query_as::<_, EnrolledCourseRow>(
            r#"
            SELECT e.enrollment_id, s.section_id, s.section_code,
                   c.course_id, c.course_code, c.course_title, c.credits, s.capacity,
                   i.first_name || ' ' || i.last_name AS instructor_name,
                   e.enrolled_at
            FROM enrollment e
            JOIN section s ON s.section_id = e.section_id
            JOIN course c ON c.course_id = s.course_id
            LEFT JOIN instructor i ON i.instructor_id = s.instructor_id
            WHERE e.student_id = $1
            ORDER BY c.course_code, s.section_code
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to load enrolled courses")
    }

    async fn section_utilization(&self) -> Result<Vec<SectionUtilizationRow>> {
        sqlx::query_as::<_, SectionUtilizationRow>(
            r#"
            SELECT s.section_id, c.course_code, c.course_title, s.section_code,
                   d.dept_name AS department_name,
                   s.capacity, s.remaining_slots,
                   COUNT(e.enrollment_id)::bigint AS enrolled_count
            FROM section s
            JOIN course c ON c.course_id = s.course_id
            LEFT JOIN department d ON d.dept_id = c.dept_id
            LEFT JOIN enrollment e ON e.section_id = s.section_id
            GROUP BY s.section_id, c.course_code, c.course_title, s.section_code,
                     d.dept_name, s.capacity, s.remaining_slots
            ORDER BY c.course_code, s.section_code
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to load section utilization")
    }

    async fn student_load_distribution(&self) -> Result<StudentLoadReport> {
        let rows = self.student_load_rows().await?;
        let metrics = student_load_metrics(&rows);
        Ok(StudentLoadReport { rows, metrics })
    }

    async fn instructor_workload(&self) -> Result<Vec<InstructorWorkloadRow>> {
        sqlx::query_as::<_, InstructorWorkloadRow>(
            r#"
            SELECT i.instructor_id,
                   i.first_name || ' ' || i.last_name AS instructor_name,
                   d.dept_name AS department_name,
                   COUNT(DISTINCT s.section_id)::bigint AS total_sections,
                   COUNT(e.enrollment_id)::bigint AS total_students
            FROM instructor i
            LEFT JOIN department d ON d.dept_id = i.dept_id
            LEFT JOIN section s ON s.instructor_id = i.instructor_id
            LEFT JOIN enrollment e ON e.section_id = s.section_id
            GROUP BY i.instructor_id, i.first_name, i.last_name, d.dept_name
            ORDER BY total_students DESC, instructor_name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to load instructor workload")
    }
}

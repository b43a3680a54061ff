//! Postgres implementation of the enrollment port.
//!
//! Each handle wraps one `sqlx::Transaction`. Row locks come from
//! `SELECT ... FOR UPDATE` and are released at commit or rollback; sqlx
//! rolls back a transaction that is dropped without commit, which covers
//! request timeouts and cancelled tasks.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crate::enrollment::store::{EnrollmentStore, EnrollmentTx, InsertOutcome, SeatCounter};
use crate::models::{Meeting, MeetingRow, SectionId, StudentId};

#[derive(Clone, Debug)]
pub struct PgEnrollmentStore {
    pool: PgPool,
}

impl PgEnrollmentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl EnrollmentStore for PgEnrollmentStore {
    async fn begin(&self) -> Result<Box<dyn EnrollmentTx>> {
        let tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin enrollment transaction")?;
        Ok(Box::new(PgEnrollmentTx { tx }))
    }
}

struct PgEnrollmentTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl EnrollmentTx for PgEnrollmentTx {
    async fn lock_section(&mut self, section_id: SectionId) -> Result<Option<SeatCounter>> {
        let row = sqlx::query_as::<_, (i32, i32)>(
            r#"
            SELECT capacity, remaining_slots
            FROM section
            WHERE section_id = $1
            FOR UPDATE
            "#,
        )
        .bind(section_id)
        .fetch_optional(&mut *self.tx)
        .await
        .context("Failed to lock section")?;

        Ok(row.map(|(capacity, remaining_slots)| SeatCounter {
            capacity,
            remaining_slots,
        }))
    }

    async fn lock_student(&mut self, student_id: StudentId) -> Result<bool> {
        let row = sqlx::query_scalar::<_, i32>(
            r#"SELECT student_id FROM student WHERE student_id = $1 FOR UPDATE"#,
        )
        .bind(student_id)
        .fetch_optional(&mut *self.tx)
        .await
        .context("Failed to lock student")?;
        Ok(row.is_some())
    }

    async fn enrollment_exists(
        &mut self,
        student_id: StudentId,
        section_id: SectionId,
    ) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS (SELECT 1 FROM enrollment WHERE student_id = $1 AND section_id = $2)"#,
        )
        .bind(student_id)
        .bind(section_id)
        .fetch_one(&mut *self.tx)
        .await
        .context("Failed to check existing enrollment")
    }

    async fn section_meetings(&mut self, section_id: SectionId) -> Result<Vec<Meeting>> {
        sqlx::query_as::<_, Meeting>(
            r#"
            SELECT day_of_week, start_time, end_time
            FROM section_schedule
            WHERE section_id = $1
            ORDER BY schedule_id
            "#,
        )
        .bind(section_id)
        .fetch_all(&mut *self.tx)
        .await
        .context("Failed to load section meetings")
    }

    async fn student_meetings(
        &mut self,
        student_id: StudentId,
    ) -> Result<Vec<(SectionId, Meeting)>> {
        let rows = sqlx::query_as::<_, MeetingRow>(
            r#"
            SELECT ss.section_id, ss.day_of_week, ss.start_time, ss.end_time
            FROM enrollment e
            JOIN section_schedule ss ON ss.section_id = e.section_id
            WHERE e.student_id = $1
            ORDER BY e.section_id, ss.schedule_id
            "#,
        )
        .bind(student_id)
        .fetch_all(&mut *self.tx)
        .await
        .context("Failed to load student meetings")?;

        Ok(rows.into_iter().map(|r| (r.section_id, r.meeting)).collect())
    }

    async fn take_seat(&mut self, section_id: SectionId) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE section
            SET remaining_slots = remaining_slots - 1
            WHERE section_id = $1 AND remaining_slots > 0
            "#,
        )
        .bind(section_id)
        .execute(&mut *self.tx)
        .await
        .context("Failed to decrement remaining slots")?;
        Ok(result.rows_affected() == 1)
    }

    async fn release_seat(&mut self, section_id: SectionId) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE section
            SET remaining_slots = LEAST(remaining_slots + 1, capacity)
            WHERE section_id = $1
            "#,
        )
        .bind(section_id)
        .execute(&mut *self.tx)
        .await
        .context("Failed to restore remaining slots")?;
        Ok(())
    }

    async fn insert_enrollment(
        &mut self,
        student_id: StudentId,
        section_id: SectionId,
    ) -> Result<InsertOutcome> {
        let result = sqlx::query(
            r#"
            INSERT INTO enrollment (student_id, section_id)
            VALUES ($1, $2)
            ON CONFLICT ON CONSTRAINT enrollment_student_section_unique DO NOTHING
            "#,
        )
        .bind(student_id)
        .bind(section_id)
        .execute(&mut *self.tx)
        .await
        .context("Failed to insert enrollment")?;

        Ok(if result.rows_affected() == 1 {
            InsertOutcome::Inserted
        } else {
            InsertOutcome::Duplicate
        })
    }

    async fn delete_enrollment(
        &mut self,
        student_id: StudentId,
        section_id: SectionId,
    ) -> Result<bool> {
        let result =
            sqlx::query(r#"DELETE FROM enrollment WHERE student_id = $1 AND section_id = $2"#)
                .bind(student_id)
                .bind(section_id)
                .execute(&mut *self.tx)
                .await
                .context("Failed to delete enrollment")?;
        Ok(result.rows_affected() > 0)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx
            .commit()
            .await
            .context("Failed to commit enrollment transaction")
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx
            .rollback()
            .await
            .context("Failed to roll back enrollment transaction")
    }
}
